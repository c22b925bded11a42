use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::TimezoneConfig;

/// Fallback source zone when the school identifier is absent or unknown.
pub const DEFAULT_SCHOOL_TZ: Tz = chrono_tz::America::Chicago;

/// Fallback target zone when the user identifier is unknown.
pub const DEFAULT_USER_TZ: Tz = chrono_tz::America::New_York;

/// Projects wall-clock values from the school timezone into the user
/// timezone.
///
/// Without a user zone the projector is floating: wall clocks pass through
/// untouched and are serialized with no zone designator, matching how
/// academic deadlines are conventionally expressed. With a user zone, a
/// wall clock is anchored in the school zone, converted to the instant it
/// represents, and re-expressed as the user-zone wall clock; downstream
/// serialization still treats the result as floating.
#[derive(Debug, Clone, Copy)]
pub struct TzProjector {
    school: Tz,
    user: Option<Tz>,
}

impl TzProjector {
    /// Builds a projector from named zones, falling back to fixed defaults
    /// on unknown identifiers instead of failing the request.
    pub fn from_config(config: &TimezoneConfig) -> Self {
        let school = config
            .school
            .as_deref()
            .map_or(DEFAULT_SCHOOL_TZ, |name| resolve(name, DEFAULT_SCHOOL_TZ));
        let user = config
            .user
            .as_deref()
            .map(|name| resolve(name, DEFAULT_USER_TZ));
        Self { school, user }
    }

    /// Whether emitted wall clocks skip projection entirely.
    pub fn is_floating(&self) -> bool {
        self.user.is_none()
    }

    /// Projects a school-zone wall clock into the user-zone wall clock.
    ///
    /// Identity in floating mode. A wall clock that does not exist in the
    /// school zone (DST gap) keeps its stated value.
    pub fn project(&self, wall: NaiveDateTime) -> NaiveDateTime {
        let Some(user) = self.user else {
            return wall;
        };
        match self.school.from_local_datetime(&wall).earliest() {
            Some(anchored) => anchored.with_timezone(&user).naive_local(),
            None => wall,
        }
    }

    /// Re-expresses an explicitly zoned instant as a school-zone wall
    /// clock, so it can flow through the same projection as naive input.
    pub fn to_school_wall(&self, instant: DateTime<FixedOffset>) -> NaiveDateTime {
        instant.with_timezone(&self.school).naive_local()
    }
}

impl Default for TzProjector {
    fn default() -> Self {
        Self::from_config(&TimezoneConfig::default())
    }
}

fn resolve(name: &str, fallback: Tz) -> Tz {
    name.parse().unwrap_or_else(|_| {
        tracing::warn!(zone = name, fallback = %fallback, "unknown timezone identifier, using fallback");
        fallback
    })
}
