//! Catalog Registration Tests
//!
//! - Every structure id is claimed by exactly one type
//! - Broken descriptors are refused at startup
//! - The datastore only handles registered types

use std::sync::Arc;

use chrono::NaiveDate;

use hashindex::catalog::{CatalogError, StructureDescriptor, StructureStatus};
use hashindex::codec::{CodecResult, FieldId, FieldKind, RecordDecoder, RecordEncoder};
use hashindex::index::{IndexSpec, Selector};
use hashindex::structures::{register_all, PersonNumber, PERSON_NUMBER_STRUCTURE_ID};
use hashindex::{
    AppIdentity, CatalogBuilder, Datastore, DatastoreConfig, DatastoreError, FieldValue,
    MemoryStore, Record, RecordHeader,
};

// =============================================================================
// Fixture Structures
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixtureField {
    Id,
    Code,
}

impl FieldId for FixtureField {
    fn name(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Code => "Code",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Array(32),
            Self::Code => FieldKind::U64,
        }
    }
}

static IMPOSTOR: StructureDescriptor<FixtureField> = StructureDescriptor {
    id: PERSON_NUMBER_STRUCTURE_ID,
    name: "Impostor",
    issue_date: "2021-01-01",
    status: StructureStatus::PreAlpha,
    fields: &[FixtureField::Id, FixtureField::Code],
    indexes: &[IndexSpec::primary("ID", &[Selector::Field(FixtureField::Id)])],
};

static TWIN_INDEXES: StructureDescriptor<FixtureField> = StructureDescriptor {
    id: 42,
    name: "TwinIndexes",
    issue_date: "2021-01-01",
    status: StructureStatus::PreAlpha,
    fields: &[FixtureField::Id, FixtureField::Code],
    indexes: &[
        IndexSpec::primary("ID", &[Selector::Field(FixtureField::Id)]),
        IndexSpec::primary("AlsoID", &[Selector::Field(FixtureField::Id)]),
    ],
};

/// One record type per descriptor above
#[derive(Debug, Default)]
struct FixtureRecord<const TWIN: bool> {
    header: RecordHeader,
    id: [u8; 32],
    code: u64,
}

impl<const TWIN: bool> Record for FixtureRecord<TWIN> {
    type Field = FixtureField;

    fn descriptor() -> &'static StructureDescriptor<FixtureField> {
        if TWIN {
            &TWIN_INDEXES
        } else {
            &IMPOSTOR
        }
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn encode_body(&self, enc: &mut RecordEncoder) -> CodecResult<()> {
        enc.put_array(&self.id)?;
        enc.put_u64(self.code)
    }

    fn decode_body(header: RecordHeader, dec: &mut RecordDecoder<'_>) -> CodecResult<Self> {
        Ok(Self {
            header,
            id: dec.get_array()?,
            code: dec.get_u64()?,
        })
    }

    fn field(&self, field: FixtureField) -> FieldValue<'_> {
        match field {
            FixtureField::Id => FieldValue::Bytes(&self.id),
            FixtureField::Code => FieldValue::U64(self.code),
        }
    }
}

type Impostor = FixtureRecord<false>;
type TwinIndexes = FixtureRecord<true>;

// =============================================================================
// Registration
// =============================================================================

/// Two types may not share a structure id.
#[test]
fn test_duplicate_structure_id_refused() {
    let err = CatalogBuilder::new()
        .register::<PersonNumber>()
        .unwrap()
        .register::<Impostor>()
        .unwrap_err();
    assert_eq!(
        err,
        CatalogError::DuplicateStructure {
            id: PERSON_NUMBER_STRUCTURE_ID,
            existing: "PersonNumber",
            name: "Impostor",
        }
    );
    assert_eq!(err.code(), "HX_CATALOG_DUPLICATE_STRUCTURE");
}

/// Indexes deriving identical keys are refused.
#[test]
fn test_identical_key_shapes_refused() {
    let err = CatalogBuilder::new().register::<TwinIndexes>().unwrap_err();
    assert_eq!(err.code(), "HX_CATALOG_INVALID_DESCRIPTOR");
    assert!(err.to_string().contains("AlsoID"));
}

/// Registered summaries carry the descriptor's facts, in id order.
#[test]
fn test_structure_info() {
    let catalog = register_all(CatalogBuilder::new()).unwrap().build();
    let info = catalog.get(PERSON_NUMBER_STRUCTURE_ID).unwrap();
    assert_eq!(info.name, "PersonNumber");
    assert_eq!(info.status, StructureStatus::PreAlpha);
    assert_eq!(info.issued, NaiveDate::from_ymd_opt(2020, 9, 2).unwrap());
    assert_eq!(info.indexes, vec!["PersonID", "Number"]);
    assert_eq!(info.stack_len, PersonNumber::descriptor().stack_len());

    let names: Vec<_> = catalog.iter().map(|info| info.name).collect();
    assert_eq!(
        names,
        vec!["Wiki", "UserAppConnection", "FinancialTransaction", "PersonNumber"]
    );
}

// =============================================================================
// Datastore Gate
// =============================================================================

/// A type claiming a registered id under another name is not accepted.
#[test]
fn test_impostor_refused_by_datastore() {
    let catalog = register_all(CatalogBuilder::new()).unwrap().build();
    let config = DatastoreConfig::for_identity(&AppIdentity::new([1; 32], [2; 32]));
    let ds = Datastore::new(Arc::new(MemoryStore::new()), Arc::new(catalog), config).unwrap();

    let err = ds.save_new(&mut Impostor::default()).unwrap_err();
    assert!(matches!(
        err,
        DatastoreError::Catalog(CatalogError::Unregistered {
            name: "Impostor",
            ..
        })
    ));
    assert_eq!(ds.store().record_count(), 0);

    let err = ds
        .get_last::<Impostor>("ID", &[FieldValue::Bytes(&[0; 32])])
        .unwrap_err();
    assert_eq!(err.code(), "HX_CATALOG_UNREGISTERED");
}
