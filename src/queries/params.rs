//! Query-string helpers shared by the filter structs.

use serde::de::{DeserializeOwned, Error as _, IntoDeserializer, value::StrDeserializer};
use serde::{Deserialize, Deserializer};

/// Deserialize `a,b,c` into a list, parsing each item with its own serde impl.
///
/// Blank items are skipped. A list with no items is `None`, so `?amenities=`
/// adds no predicate.
pub fn comma_separated<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                let de: StrDeserializer<'_, serde::de::value::Error> = item.into_deserializer();
                T::deserialize(de).map_err(D::Error::custom)
            })
            .collect::<Result<Vec<T>, D::Error>>()
    })
    .transpose()
    .map(|list| list.filter(|items| !items.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::applications::ApplicationStatus;
    use axum::extract::Query;

    fn parse(query: &str) -> Result<Params, axum::extract::rejection::QueryRejection> {
        let uri: axum::http::Uri = format!("/search?{query}").parse().unwrap();
        Query::<Params>::try_from_uri(&uri).map(|Query(p)| p)
    }

    #[derive(Debug, Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "comma_separated")]
        amenities: Option<Vec<String>>,
        #[serde(default, deserialize_with = "comma_separated")]
        statuses: Option<Vec<ApplicationStatus>>,
    }

    #[test]
    fn test_split_and_parse() {
        let p = parse("amenities=pool,%20gym&statuses=PENDING,UNDER_REVIEW").unwrap();
        assert_eq!(p.amenities.unwrap(), vec!["pool", "gym"]);
        assert_eq!(
            p.statuses.unwrap(),
            vec![ApplicationStatus::Pending, ApplicationStatus::UnderReview]
        );
    }

    #[test]
    fn test_missing_is_none() {
        let p = parse("").unwrap();
        assert!(p.amenities.is_none());
        assert!(p.statuses.is_none());
    }

    #[test]
    fn test_blank_list_is_none() {
        let p = parse("amenities=&statuses=%20,").unwrap();
        assert!(p.amenities.is_none());
        assert!(p.statuses.is_none());
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        assert!(parse("statuses=PENDING,LOST").is_err());
    }
}
