//!
//! Module allows to deserialize server timestamps directly to epoch
//! milliseconds. The backend emits either a numeric epoch-milliseconds
//! value or an RFC 3339 string depending on the endpoint, both must end
//! up in the same comparable numeric form.
//!

use serde::{Deserialize, Deserializer};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match RawTimestamp::deserialize(d)? {
        RawTimestamp::Millis(millis) => Ok(millis),
        RawTimestamp::Text(text) => {
            let datetime =
                OffsetDateTime::parse(&text, &Rfc3339).map_err(serde::de::Error::custom)?;

            Ok((datetime.unix_timestamp_nanos() / 1_000_000) as i64)
        }
    }
}
