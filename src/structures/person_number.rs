//! Phone-style numbers owned by a person
//!
//! One logical entity per person: the latest version is found through the
//! person id, and a number resolves to its person through a second index.

use crate::catalog::{StructureDescriptor, StructureStatus};
use crate::codec::{
    CodecResult, FieldId, FieldKind, FieldValue, Record, RecordDecoder, RecordEncoder, RecordHeader,
};
use crate::index::{IndexSpec, Selector};

/// Schema tag of `PersonNumber`
pub const PERSON_NUMBER_STRUCTURE_ID: u64 = 18_356_608_896_785_246_637;

/// Fields of `PersonNumber`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonNumberField {
    PersonId,
    Number,
    Status,
}

impl FieldId for PersonNumberField {
    fn name(self) -> &'static str {
        match self {
            PersonNumberField::PersonId => "PersonID",
            PersonNumberField::Number => "Number",
            PersonNumberField::Status => "Status",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            PersonNumberField::PersonId => FieldKind::Array(32),
            PersonNumberField::Number => FieldKind::U64,
            PersonNumberField::Status => FieldKind::U8,
        }
    }
}

/// Registration state of a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PersonNumberStatus {
    #[default]
    Unset = 0,
    Registered = 1,
    Removed = 2,
    BlockedByJustice = 3,
}

impl TryFrom<u8> for PersonNumberStatus {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, u8> {
        match v {
            0 => Ok(Self::Unset),
            1 => Ok(Self::Registered),
            2 => Ok(Self::Removed),
            3 => Ok(Self::BlockedByJustice),
            other => Err(other),
        }
    }
}

/// A number registered to a person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonNumber {
    pub header: RecordHeader,
    pub person_id: [u8; 32],
    /// Starts with the country code, e.g. 989123456789
    pub number: u64,
    pub status: PersonNumberStatus,
}

impl PersonNumber {
    /// Primary index: latest version by person
    pub const BY_PERSON_ID: &'static str = "PersonID";
    /// Secondary index: person by number
    pub const BY_NUMBER: &'static str = "Number";
}

static DESCRIPTOR: StructureDescriptor<PersonNumberField> = StructureDescriptor {
    id: PERSON_NUMBER_STRUCTURE_ID,
    name: "PersonNumber",
    issue_date: "2020-09-02",
    status: StructureStatus::PreAlpha,
    fields: &[
        PersonNumberField::PersonId,
        PersonNumberField::Number,
        PersonNumberField::Status,
    ],
    indexes: &[
        IndexSpec::primary(
            PersonNumber::BY_PERSON_ID,
            &[Selector::Field(PersonNumberField::PersonId)],
        ),
        IndexSpec::secondary(
            PersonNumber::BY_NUMBER,
            &[Selector::Field(PersonNumberField::Number)],
            PersonNumberField::PersonId,
            PersonNumber::BY_PERSON_ID,
        ),
    ],
};

impl Record for PersonNumber {
    type Field = PersonNumberField;

    fn descriptor() -> &'static StructureDescriptor<PersonNumberField> {
        &DESCRIPTOR
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn encode_body(&self, enc: &mut RecordEncoder) -> CodecResult<()> {
        enc.put_array(&self.person_id)?;
        enc.put_u64(self.number)?;
        enc.put_u8(self.status as u8)
    }

    fn decode_body(header: RecordHeader, dec: &mut RecordDecoder<'_>) -> CodecResult<Self> {
        Ok(Self {
            header,
            person_id: dec.get_array()?,
            number: dec.get_u64()?,
            status: dec.get_enum("Status")?,
        })
    }

    fn field(&self, field: PersonNumberField) -> FieldValue<'_> {
        match field {
            PersonNumberField::PersonId => FieldValue::Bytes(&self.person_id),
            PersonNumberField::Number => FieldValue::U64(self.number),
            PersonNumberField::Status => FieldValue::U8(self.status as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode, HEADER_LEN};

    #[test]
    fn test_stack_len() {
        // 32-byte person id, u64 number, u8 status
        assert_eq!(PersonNumber::descriptor().stack_len(), HEADER_LEN + 41);
    }

    #[test]
    fn test_descriptor_valid() {
        assert_eq!(PersonNumber::descriptor().validate(), Ok(()));
    }

    #[test]
    fn test_body_offsets() {
        let mut pn = PersonNumber {
            person_id: [0xAB; 32],
            number: 989_123_456_789,
            status: PersonNumberStatus::Registered,
            ..PersonNumber::default()
        };
        let buf = encode(&pn).unwrap();
        assert_eq!(&buf[152..184], &[0xAB; 32]);
        assert_eq!(&buf[184..192], &989_123_456_789u64.to_le_bytes());
        assert_eq!(buf[192], 1);
        pn.header.size = buf.len() as u64;
        assert_eq!(decode::<PersonNumber>(&buf).unwrap(), pn);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let mut buf = encode(&PersonNumber::default()).unwrap();
        buf[192] = 9;
        assert!(decode::<PersonNumber>(&buf).is_err());
    }
}
