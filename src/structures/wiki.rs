//! Text and pictures describing a topic, one version per language

use crate::catalog::{StructureDescriptor, StructureStatus};
use crate::codec::{
    CodecResult, FieldId, FieldKind, FieldValue, Record, RecordDecoder, RecordEncoder, RecordHeader,
};
use crate::index::{IndexSpec, Selector};

/// Schema tag of `Wiki`
pub const WIKI_STRUCTURE_ID: u64 = 4_150_904_594_571_984_896;

/// Fields of `Wiki`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WikiField {
    Id,
    OwnerId,
    Language,
    Title,
    Text,
    Pictures,
    Status,
}

impl FieldId for WikiField {
    fn name(self) -> &'static str {
        match self {
            WikiField::Id => "ID",
            WikiField::OwnerId => "OwnerID",
            WikiField::Language => "Language",
            WikiField::Title => "Title",
            WikiField::Text => "Text",
            WikiField::Pictures => "Pictures",
            WikiField::Status => "Status",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            WikiField::Id | WikiField::OwnerId => FieldKind::Array(32),
            WikiField::Language => FieldKind::U32,
            WikiField::Title | WikiField::Text => FieldKind::Str,
            WikiField::Pictures => FieldKind::List(32),
            WikiField::Status => FieldKind::U8,
        }
    }
}

/// Editorial state of a wiki version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WikiStatus {
    #[default]
    Unset = 0,
    Suggestion = 1,
    Active = 2,
}

impl TryFrom<u8> for WikiStatus {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, u8> {
        match v {
            0 => Ok(Self::Unset),
            1 => Ok(Self::Suggestion),
            2 => Ok(Self::Active),
            other => Err(other),
        }
    }
}

/// One language version of a wiki entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wiki {
    pub header: RecordHeader,
    /// Content id shared by every language of the entry
    pub id: [u8; 32],
    pub owner_id: [u8; 32],
    pub language: u32,
    pub title: String,
    /// Styled text
    pub text: String,
    /// Object ids of attached pictures
    pub pictures: Vec<[u8; 32]>,
    pub status: WikiStatus,
}

impl Wiki {
    /// Primary: latest version of an entry in one language
    pub const BY_ID_LANGUAGE: &'static str = "IDLanguage";
    /// Entry ids by owner
    pub const LIST_BY_OWNER: &'static str = "Owner";
    /// Entry ids by exact title
    ///
    /// Key bytes are a plain concatenation, so a 27-byte title followed by
    /// the "Title" literal hashes the same as an owner id equal to those 32
    /// bytes under `LIST_BY_OWNER`. Both lists hold entry ids, so such a
    /// pair reads back as one merged list; callers needing an exact match
    /// compare the decoded field.
    pub const LIST_BY_TITLE: &'static str = "Title";
    /// Entry ids by exact text
    pub const LIST_BY_TEXT: &'static str = "Text";
    /// Languages an entry exists in
    pub const LIST_LANGUAGES: &'static str = "Languages";
}

static DESCRIPTOR: StructureDescriptor<WikiField> = StructureDescriptor {
    id: WIKI_STRUCTURE_ID,
    name: "Wiki",
    issue_date: "2020-09-07",
    status: StructureStatus::PreAlpha,
    fields: &[
        WikiField::Id,
        WikiField::OwnerId,
        WikiField::Language,
        WikiField::Title,
        WikiField::Text,
        WikiField::Pictures,
        WikiField::Status,
    ],
    indexes: &[
        IndexSpec::primary(
            Wiki::BY_ID_LANGUAGE,
            &[Selector::Field(WikiField::Id), Selector::Field(WikiField::Language)],
        ),
        IndexSpec::list(
            Wiki::LIST_BY_OWNER,
            &[Selector::Field(WikiField::OwnerId)],
            WikiField::Id,
        ),
        IndexSpec {
            literal: Some("Title"),
            ..IndexSpec::list(
                Wiki::LIST_BY_TITLE,
                &[Selector::Field(WikiField::Title)],
                WikiField::Id,
            )
        },
        IndexSpec {
            literal: Some("Text"),
            ..IndexSpec::list(
                Wiki::LIST_BY_TEXT,
                &[Selector::Field(WikiField::Text)],
                WikiField::Id,
            )
        },
        IndexSpec {
            literal: Some("Language"),
            ..IndexSpec::list(
                Wiki::LIST_LANGUAGES,
                &[Selector::Field(WikiField::Id)],
                WikiField::Language,
            )
        },
    ],
};

impl Record for Wiki {
    type Field = WikiField;

    fn descriptor() -> &'static StructureDescriptor<WikiField> {
        &DESCRIPTOR
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn encode_body(&self, enc: &mut RecordEncoder) -> CodecResult<()> {
        enc.put_array(&self.id)?;
        enc.put_array(&self.owner_id)?;
        enc.put_u32(self.language)?;
        enc.put_str(&self.title)?;
        enc.put_str(&self.text)?;
        enc.put_list(&self.pictures)?;
        enc.put_u8(self.status as u8)
    }

    fn decode_body(header: RecordHeader, dec: &mut RecordDecoder<'_>) -> CodecResult<Self> {
        Ok(Self {
            header,
            id: dec.get_array()?,
            owner_id: dec.get_array()?,
            language: dec.get_u32()?,
            title: dec.get_str()?,
            text: dec.get_str()?,
            pictures: dec.get_list()?,
            status: dec.get_enum("Status")?,
        })
    }

    fn field(&self, field: WikiField) -> FieldValue<'_> {
        match field {
            WikiField::Id => FieldValue::Bytes(&self.id),
            WikiField::OwnerId => FieldValue::Bytes(&self.owner_id),
            WikiField::Language => FieldValue::U32(self.language),
            WikiField::Title => FieldValue::Str(&self.title),
            WikiField::Text => FieldValue::Str(&self.text),
            WikiField::Pictures => FieldValue::Bytes(self.pictures.as_flattened()),
            WikiField::Status => FieldValue::U8(self.status as u8),
        }
    }
}
