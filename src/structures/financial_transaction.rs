//! Per-user ledger entries
//!
//! Indexed by user per UTC day: the primary chain of a day holds that day's
//! newest transaction, and the latest transaction overall is found by
//! walking back one day at a time.

use crate::catalog::{StructureDescriptor, StructureStatus};
use crate::codec::{
    CodecResult, FieldId, FieldKind, FieldValue, Record, RecordDecoder, RecordEncoder, RecordHeader,
};
use crate::index::{IndexSpec, Selector};

/// Schema tag of `FinancialTransaction`
pub const FINANCIAL_TRANSACTION_STRUCTURE_ID: u64 = 11_180_411_632_961_596_298;

/// Fields of `FinancialTransaction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialTransactionField {
    /// Header write time
    WriteTime,
    UserId,
    ReferenceId,
    ReferenceType,
    PreviousTransactionId,
    Amount,
    Balance,
}

impl FieldId for FinancialTransactionField {
    fn name(self) -> &'static str {
        match self {
            Self::WriteTime => "WriteTime",
            Self::UserId => "UserID",
            Self::ReferenceId => "ReferenceID",
            Self::ReferenceType => "ReferenceType",
            Self::PreviousTransactionId => "PreviousTransactionID",
            Self::Amount => "Amount",
            Self::Balance => "Balance",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::WriteTime | Self::Amount | Self::Balance => FieldKind::I64,
            Self::UserId | Self::ReferenceId | Self::PreviousTransactionId => FieldKind::Array(32),
            Self::ReferenceType => FieldKind::U8,
        }
    }

    fn is_header(self) -> bool {
        self == Self::WriteTime
    }
}

/// What `reference_id` points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TransactionType {
    #[default]
    Unset = 0,
    Failed = 1,
    Blocked = 2,
    Donate = 3,
    BankTransfer = 4,
    PosTransfer = 5,
    WebTransfer = 6,
    AuctionCommission = 7,
    AuctionPrice = 8,
}

impl TryFrom<u8> for TransactionType {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, u8> {
        Ok(match v {
            0 => Self::Unset,
            1 => Self::Failed,
            2 => Self::Blocked,
            3 => Self::Donate,
            4 => Self::BankTransfer,
            5 => Self::PosTransfer,
            6 => Self::WebTransfer,
            7 => Self::AuctionCommission,
            8 => Self::AuctionPrice,
            other => return Err(other),
        })
    }
}

/// One ledger entry. Amounts are in the currency's minor unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinancialTransaction {
    pub header: RecordHeader,
    pub user_id: [u8; 32],
    pub reference_id: [u8; 32],
    pub reference_type: TransactionType,
    /// Record id of the transaction this one builds on
    pub previous_transaction_id: [u8; 32],
    pub amount: i64,
    pub balance: i64,
}

impl FinancialTransaction {
    /// Primary index: newest transaction of a user on a day
    pub const BY_USER_DAILY: &'static str = "UserIDDaily";
}

static DESCRIPTOR: StructureDescriptor<FinancialTransactionField> = StructureDescriptor {
    id: FINANCIAL_TRANSACTION_STRUCTURE_ID,
    name: "FinancialTransaction",
    issue_date: "2020-09-05",
    status: StructureStatus::PreAlpha,
    fields: &[
        FinancialTransactionField::UserId,
        FinancialTransactionField::ReferenceId,
        FinancialTransactionField::ReferenceType,
        FinancialTransactionField::PreviousTransactionId,
        FinancialTransactionField::Amount,
        FinancialTransactionField::Balance,
    ],
    indexes: &[IndexSpec {
        literal: Some("UserID"),
        ..IndexSpec::primary(
            FinancialTransaction::BY_USER_DAILY,
            &[
                Selector::Field(FinancialTransactionField::UserId),
                Selector::Daily(FinancialTransactionField::WriteTime),
            ],
        )
    }],
};

impl Record for FinancialTransaction {
    type Field = FinancialTransactionField;

    fn descriptor() -> &'static StructureDescriptor<FinancialTransactionField> {
        &DESCRIPTOR
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn encode_body(&self, enc: &mut RecordEncoder) -> CodecResult<()> {
        enc.put_array(&self.user_id)?;
        enc.put_array(&self.reference_id)?;
        enc.put_u8(self.reference_type as u8)?;
        enc.put_array(&self.previous_transaction_id)?;
        enc.put_i64(self.amount)?;
        enc.put_i64(self.balance)
    }

    fn decode_body(header: RecordHeader, dec: &mut RecordDecoder<'_>) -> CodecResult<Self> {
        Ok(Self {
            header,
            user_id: dec.get_array()?,
            reference_id: dec.get_array()?,
            reference_type: dec.get_enum("ReferenceType")?,
            previous_transaction_id: dec.get_array()?,
            amount: dec.get_i64()?,
            balance: dec.get_i64()?,
        })
    }

    fn field(&self, field: FinancialTransactionField) -> FieldValue<'_> {
        use FinancialTransactionField as F;
        match field {
            F::WriteTime => FieldValue::I64(self.header.write_time),
            F::UserId => FieldValue::Bytes(&self.user_id),
            F::ReferenceId => FieldValue::Bytes(&self.reference_id),
            F::ReferenceType => FieldValue::U8(self.reference_type as u8),
            F::PreviousTransactionId => FieldValue::Bytes(&self.previous_transaction_id),
            F::Amount => FieldValue::I64(self.amount),
            F::Balance => FieldValue::I64(self.balance),
        }
    }
}
