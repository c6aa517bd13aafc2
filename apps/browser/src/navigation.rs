//! Screen routes. The detail route is keyed only by the character id.

use std::{fmt, str::FromStr};

use shared::domain::CharacterId;
use thiserror::Error;

const DETAIL_PREFIX: &str = "character_detail/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    CharacterDetail(CharacterId),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::CharacterDetail(id) => write!(f, "{DETAIL_PREFIX}{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown route '{0}'")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw == "home" {
            return Ok(Self::Home);
        }

        raw.strip_prefix(DETAIL_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .map(|id| Self::CharacterDetail(CharacterId(id)))
            .ok_or_else(|| UnknownRoute(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_route_round_trips_through_its_path() {
        let route = Route::CharacterDetail(CharacterId(42));
        assert_eq!(route.to_string(), "character_detail/42");
        assert_eq!("character_detail/42".parse::<Route>(), Ok(route));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert_eq!(
            "character_detail/rick".parse::<Route>(),
            Err(UnknownRoute("character_detail/rick".to_string()))
        );
        assert!("settings".parse::<Route>().is_err());
    }

    #[test]
    fn home_is_default() {
        assert_eq!(Route::default(), Route::Home);
        assert_eq!(" home ".parse::<Route>(), Ok(Route::Home));
    }
}
