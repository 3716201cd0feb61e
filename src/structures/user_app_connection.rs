//! Connections between a user (or a delegate acting for them) and an app
//!
//! The richest reference layout: a heap string, paired keys, conditional
//! indexes keyed on whether the connection is delegated, a daily bucket and
//! three listings.

use crate::catalog::{StructureDescriptor, StructureStatus};
use crate::codec::{
    CodecResult, FieldId, FieldKind, FieldValue, Record, RecordDecoder, RecordEncoder, RecordHeader,
};
use crate::index::{Condition, IndexSpec, Selector};

/// Schema tag of `UserAppConnection`
pub const USER_APP_CONNECTION_STRUCTURE_ID: u64 = 9_690_386_842_755_723_330;

/// Fields of `UserAppConnection`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAppConnectionField {
    /// Header write time
    WriteTime,
    Status,
    Description,
    Id,
    Weight,
    IpAddr,
    ThingId,
    UserId,
    UserType,
    DelegateUserId,
    DelegateUserType,
    PeerPublicKey,
    LastUsage,
    PacketPayloadSize,
    MaxBandwidth,
    ServiceCallCount,
    BytesSent,
    BytesReceived,
}

impl FieldId for UserAppConnectionField {
    fn name(self) -> &'static str {
        match self {
            Self::WriteTime => "WriteTime",
            Self::Status => "Status",
            Self::Description => "Description",
            Self::Id => "ID",
            Self::Weight => "Weight",
            Self::IpAddr => "IPAddr",
            Self::ThingId => "ThingID",
            Self::UserId => "UserID",
            Self::UserType => "UserType",
            Self::DelegateUserId => "DelegateUserID",
            Self::DelegateUserType => "DelegateUserType",
            Self::PeerPublicKey => "PeerPublicKey",
            Self::LastUsage => "LastUsage",
            Self::PacketPayloadSize => "PacketPayloadSize",
            Self::MaxBandwidth => "MaxBandwidth",
            Self::ServiceCallCount => "ServiceCallCount",
            Self::BytesSent => "BytesSent",
            Self::BytesReceived => "BytesReceived",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::WriteTime | Self::LastUsage => FieldKind::I64,
            Self::Status
            | Self::Weight
            | Self::UserType
            | Self::DelegateUserType => FieldKind::U8,
            Self::Description => FieldKind::Str,
            Self::Id
            | Self::ThingId
            | Self::UserId
            | Self::DelegateUserId
            | Self::PeerPublicKey => FieldKind::Array(32),
            Self::IpAddr => FieldKind::Array(16),
            Self::PacketPayloadSize => FieldKind::U16,
            Self::MaxBandwidth | Self::ServiceCallCount | Self::BytesSent | Self::BytesReceived => {
                FieldKind::U64
            }
        }
    }

    fn is_header(self) -> bool {
        self == Self::WriteTime
    }
}

/// Lifecycle of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConnectionStatus {
    #[default]
    Unset = 0,
    Issued = 1,
    Updated = 2,
    Expired = 3,
    Revoked = 4,
}

impl TryFrom<u8> for ConnectionStatus {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, u8> {
        Ok(match v {
            0 => Self::Unset,
            1 => Self::Issued,
            2 => Self::Updated,
            3 => Self::Expired,
            4 => Self::Revoked,
            other => return Err(other),
        })
    }
}

/// A user's (or delegate's) connection to an app
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAppConnection {
    pub header: RecordHeader,
    pub status: ConnectionStatus,
    /// Free text the user picks to recognise the connection
    pub description: String,
    /// Logical connection id, stable across versions
    pub id: [u8; 32],
    pub weight: u8,
    pub ip_addr: [u8; 16],
    pub thing_id: [u8; 32],
    pub user_id: [u8; 32],
    pub user_type: u8,
    /// Zero unless a delegate acts for `user_id`
    pub delegate_user_id: [u8; 32],
    pub delegate_user_type: u8,
    pub peer_public_key: [u8; 32],
    pub last_usage: i64,
    pub packet_payload_size: u16,
    pub max_bandwidth: u64,
    pub service_call_count: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl UserAppConnection {
    /// Primary: latest version by connection id
    pub const BY_ID: &'static str = "ID";
    /// Connection ids by thing
    pub const BY_THING_ID: &'static str = "ThingID";
    /// Connection id by user and thing
    pub const BY_USER_ID_THING_ID: &'static str = "UserIDThingID";
    /// Connection ids a user holds directly
    pub const BY_USER_ID: &'static str = "UserID";
    /// Connection ids gotten by a delegate
    pub const BY_DELEGATE_USER_ID: &'static str = "DelegateUserID";
    /// Connection id by user and delegate
    pub const BY_USER_ID_DELEGATE_USER_ID: &'static str = "UserIDDelegateUserID";
    /// Connection ids a user has given to delegates
    pub const BY_USER_ID_IF_DELEGATED: &'static str = "UserIDIfDelegateUserID";
    /// Connection ids by user type per day
    pub const BY_USER_TYPE_DAILY: &'static str = "UserTypeWriteTime";
    /// Things a user is connected from
    pub const LIST_THING_ID: &'static str = "ListThingID";
    /// Users connected from a thing
    pub const LIST_USER_ID: &'static str = "ListUserID";
    /// Delegates of a user
    pub const LIST_DELEGATE_USER_ID: &'static str = "ListDelegateUserID";
}

use UserAppConnectionField as F;

static DESCRIPTOR: StructureDescriptor<UserAppConnectionField> = StructureDescriptor {
    id: USER_APP_CONNECTION_STRUCTURE_ID,
    name: "UserAppConnection",
    issue_date: "2020-09-28",
    status: StructureStatus::PreAlpha,
    fields: &[
        F::Status,
        F::Description,
        F::Id,
        F::Weight,
        F::IpAddr,
        F::ThingId,
        F::UserId,
        F::UserType,
        F::DelegateUserId,
        F::DelegateUserType,
        F::PeerPublicKey,
        F::LastUsage,
        F::PacketPayloadSize,
        F::MaxBandwidth,
        F::ServiceCallCount,
        F::BytesSent,
        F::BytesReceived,
    ],
    indexes: &[
        IndexSpec {
            literal: Some("ID"),
            ..IndexSpec::primary(UserAppConnection::BY_ID, &[Selector::Field(F::Id)])
        },
        IndexSpec {
            literal: Some("ThingID"),
            condition: Condition::IfPresent(F::ThingId),
            ..IndexSpec::secondary(
                UserAppConnection::BY_THING_ID,
                &[Selector::Field(F::ThingId)],
                F::Id,
                UserAppConnection::BY_ID,
            )
        },
        IndexSpec {
            literal: Some("UserIDThingID"),
            condition: Condition::IfPresent(F::ThingId),
            ..IndexSpec::secondary(
                UserAppConnection::BY_USER_ID_THING_ID,
                &[Selector::Field(F::UserId), Selector::Field(F::ThingId)],
                F::Id,
                UserAppConnection::BY_ID,
            )
        },
        IndexSpec {
            literal: Some("UserID"),
            condition: Condition::IfAbsent(F::DelegateUserId),
            ..IndexSpec::secondary(
                UserAppConnection::BY_USER_ID,
                &[Selector::Field(F::UserId)],
                F::Id,
                UserAppConnection::BY_ID,
            )
        },
        IndexSpec {
            literal: Some("DelegateUserID"),
            condition: Condition::IfPresent(F::DelegateUserId),
            ..IndexSpec::secondary(
                UserAppConnection::BY_DELEGATE_USER_ID,
                &[Selector::Field(F::DelegateUserId)],
                F::Id,
                UserAppConnection::BY_ID,
            )
        },
        IndexSpec {
            literal: Some("UserIDDelegateUserID"),
            condition: Condition::IfPresent(F::DelegateUserId),
            ..IndexSpec::secondary(
                UserAppConnection::BY_USER_ID_DELEGATE_USER_ID,
                &[Selector::Field(F::UserId), Selector::Field(F::DelegateUserId)],
                F::Id,
                UserAppConnection::BY_ID,
            )
        },
        IndexSpec {
            literal: Some("UserIDIfDelegateUserID"),
            condition: Condition::IfPresent(F::DelegateUserId),
            ..IndexSpec::secondary(
                UserAppConnection::BY_USER_ID_IF_DELEGATED,
                &[Selector::Field(F::UserId)],
                F::Id,
                UserAppConnection::BY_ID,
            )
        },
        IndexSpec {
            literal: Some("UserTypeWriteTime"),
            ..IndexSpec::secondary(
                UserAppConnection::BY_USER_TYPE_DAILY,
                &[Selector::Field(F::UserType), Selector::Daily(F::WriteTime)],
                F::Id,
                UserAppConnection::BY_ID,
            )
        },
        IndexSpec {
            literal: Some("ListThingID"),
            condition: Condition::IfPresent(F::ThingId),
            ..IndexSpec::list(
                UserAppConnection::LIST_THING_ID,
                &[Selector::Field(F::UserId)],
                F::ThingId,
            )
        },
        IndexSpec {
            literal: Some("ListUserID"),
            condition: Condition::IfPresent(F::ThingId),
            ..IndexSpec::list(
                UserAppConnection::LIST_USER_ID,
                &[Selector::Field(F::ThingId)],
                F::UserId,
            )
        },
        IndexSpec {
            literal: Some("ListDelegateUserID"),
            condition: Condition::IfPresent(F::DelegateUserId),
            ..IndexSpec::list(
                UserAppConnection::LIST_DELEGATE_USER_ID,
                &[Selector::Field(F::UserId)],
                F::DelegateUserId,
            )
        },
    ],
};

impl Record for UserAppConnection {
    type Field = UserAppConnectionField;

    fn descriptor() -> &'static StructureDescriptor<UserAppConnectionField> {
        &DESCRIPTOR
    }

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn encode_body(&self, enc: &mut RecordEncoder) -> CodecResult<()> {
        enc.put_u8(self.status as u8)?;
        enc.put_str(&self.description)?;
        enc.put_array(&self.id)?;
        enc.put_u8(self.weight)?;
        enc.put_array(&self.ip_addr)?;
        enc.put_array(&self.thing_id)?;
        enc.put_array(&self.user_id)?;
        enc.put_u8(self.user_type)?;
        enc.put_array(&self.delegate_user_id)?;
        enc.put_u8(self.delegate_user_type)?;
        enc.put_array(&self.peer_public_key)?;
        enc.put_i64(self.last_usage)?;
        enc.put_u16(self.packet_payload_size)?;
        enc.put_u64(self.max_bandwidth)?;
        enc.put_u64(self.service_call_count)?;
        enc.put_u64(self.bytes_sent)?;
        enc.put_u64(self.bytes_received)
    }

    fn decode_body(header: RecordHeader, dec: &mut RecordDecoder<'_>) -> CodecResult<Self> {
        Ok(Self {
            header,
            status: dec.get_enum("Status")?,
            description: dec.get_str()?,
            id: dec.get_array()?,
            weight: dec.get_u8()?,
            ip_addr: dec.get_array()?,
            thing_id: dec.get_array()?,
            user_id: dec.get_array()?,
            user_type: dec.get_u8()?,
            delegate_user_id: dec.get_array()?,
            delegate_user_type: dec.get_u8()?,
            peer_public_key: dec.get_array()?,
            last_usage: dec.get_i64()?,
            packet_payload_size: dec.get_u16()?,
            max_bandwidth: dec.get_u64()?,
            service_call_count: dec.get_u64()?,
            bytes_sent: dec.get_u64()?,
            bytes_received: dec.get_u64()?,
        })
    }

    fn field(&self, field: UserAppConnectionField) -> FieldValue<'_> {
        match field {
            F::WriteTime => FieldValue::I64(self.header.write_time),
            F::Status => FieldValue::U8(self.status as u8),
            F::Description => FieldValue::Str(&self.description),
            F::Id => FieldValue::Bytes(&self.id),
            F::Weight => FieldValue::U8(self.weight),
            F::IpAddr => FieldValue::Bytes(&self.ip_addr),
            F::ThingId => FieldValue::Bytes(&self.thing_id),
            F::UserId => FieldValue::Bytes(&self.user_id),
            F::UserType => FieldValue::U8(self.user_type),
            F::DelegateUserId => FieldValue::Bytes(&self.delegate_user_id),
            F::DelegateUserType => FieldValue::U8(self.delegate_user_type),
            F::PeerPublicKey => FieldValue::Bytes(&self.peer_public_key),
            F::LastUsage => FieldValue::I64(self.last_usage),
            F::PacketPayloadSize => FieldValue::U16(self.packet_payload_size),
            F::MaxBandwidth => FieldValue::U64(self.max_bandwidth),
            F::ServiceCallCount => FieldValue::U64(self.service_call_count),
            F::BytesSent => FieldValue::U64(self.bytes_sent),
            F::BytesReceived => FieldValue::U64(self.bytes_received),
        }
    }
}
