use crate::consts::NS_METAPATH;
use crate::xdm::ExpandedName;
use core::fmt;

/// Type identity of an atomic value.
///
/// Concrete variants correspond one to one with [`crate::AtomicItem`]
/// variants. The abstract variants (`AnyAtomic`, `Numeric`, `Duration`,
/// `IpAddress`, `Markup`) only appear in signatures and casts and have no
/// values of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtomicType {
    AnyAtomic,
    Numeric,
    Duration,
    IpAddress,
    Markup,
    String,
    Token,
    Hostname,
    EmailAddress,
    UntypedAtomic,
    Boolean,
    Decimal,
    Integer,
    NonNegativeInteger,
    PositiveInteger,
    DayTimeDuration,
    YearMonthDuration,
    Date,
    DateWithTimezone,
    DateTime,
    DateTimeWithTimezone,
    Time,
    TimeWithTimezone,
    Base64Binary,
    HexBinary,
    AnyUri,
    UriReference,
    Ipv4Address,
    Ipv6Address,
    Uuid,
    MarkupLine,
    MarkupMultiline,
}

impl AtomicType {
    /// Every type that has values of its own.
    pub const CONCRETE: &'static [AtomicType] = &[
        Self::String,
        Self::Token,
        Self::Hostname,
        Self::EmailAddress,
        Self::UntypedAtomic,
        Self::Boolean,
        Self::Decimal,
        Self::Integer,
        Self::NonNegativeInteger,
        Self::PositiveInteger,
        Self::DayTimeDuration,
        Self::YearMonthDuration,
        Self::Date,
        Self::DateWithTimezone,
        Self::DateTime,
        Self::DateTimeWithTimezone,
        Self::Time,
        Self::TimeWithTimezone,
        Self::Base64Binary,
        Self::HexBinary,
        Self::AnyUri,
        Self::UriReference,
        Self::Ipv4Address,
        Self::Ipv6Address,
        Self::Uuid,
        Self::MarkupLine,
        Self::MarkupMultiline,
    ];

    /// Local name of the type in the Metapath namespace.
    pub fn name(self) -> &'static str {
        match self {
            Self::AnyAtomic => "any-atomic-type",
            Self::Numeric => "numeric",
            Self::Duration => "duration",
            Self::IpAddress => "ip-address",
            Self::Markup => "markup",
            Self::String => "string",
            Self::Token => "token",
            Self::Hostname => "hostname",
            Self::EmailAddress => "email-address",
            Self::UntypedAtomic => "untyped-atomic",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::NonNegativeInteger => "non-negative-integer",
            Self::PositiveInteger => "positive-integer",
            Self::DayTimeDuration => "day-time-duration",
            Self::YearMonthDuration => "year-month-duration",
            Self::Date => "date",
            Self::DateWithTimezone => "date-with-timezone",
            Self::DateTime => "date-time",
            Self::DateTimeWithTimezone => "date-time-with-timezone",
            Self::Time => "time",
            Self::TimeWithTimezone => "time-with-timezone",
            Self::Base64Binary => "base64",
            Self::HexBinary => "hex-binary",
            Self::AnyUri => "uri",
            Self::UriReference => "uri-reference",
            Self::Ipv4Address => "ip-v4-address",
            Self::Ipv6Address => "ip-v6-address",
            Self::Uuid => "uuid",
            Self::MarkupLine => "markup-line",
            Self::MarkupMultiline => "markup-multiline",
        }
    }

    pub fn qname(self) -> ExpandedName {
        ExpandedName::ns(NS_METAPATH, self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        const ABSTRACT: &[AtomicType] =
            &[AtomicType::AnyAtomic, AtomicType::Numeric, AtomicType::Duration, AtomicType::IpAddress, AtomicType::Markup];
        ABSTRACT.iter().chain(Self::CONCRETE).copied().find(|t| t.name() == name)
    }

    /// The immediate supertype; `None` only for `AnyAtomic`.
    pub fn parent(self) -> Option<Self> {
        use AtomicType::*;
        Some(match self {
            AnyAtomic => return None,
            Numeric | Duration | IpAddress | Markup | String | UntypedAtomic | Boolean | Date | DateTime | Time
            | Base64Binary | HexBinary | AnyUri | Uuid => AnyAtomic,
            Token | Hostname | EmailAddress => String,
            Decimal => Numeric,
            Integer => Decimal,
            NonNegativeInteger => Integer,
            PositiveInteger => NonNegativeInteger,
            DayTimeDuration | YearMonthDuration => Duration,
            DateWithTimezone => Date,
            DateTimeWithTimezone => DateTime,
            TimeWithTimezone => Time,
            UriReference => AnyUri,
            Ipv4Address | Ipv6Address => IpAddress,
            MarkupLine | MarkupMultiline => Markup,
        })
    }

    /// Reflexive subtype test over the type lattice.
    pub fn is_subtype_of(self, other: Self) -> bool {
        let mut current = Some(self);
        while let Some(t) = current {
            if t == other {
                return true;
            }
            current = t.parent();
        }
        false
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, Self::AnyAtomic | Self::Numeric | Self::Duration | Self::IpAddress | Self::Markup)
    }

    pub fn is_numeric(self) -> bool {
        self.is_subtype_of(Self::Numeric)
    }

    pub fn is_duration(self) -> bool {
        self.is_subtype_of(Self::Duration)
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "meta:{}", self.name())
    }
}
