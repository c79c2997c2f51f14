/// Accepts a float given either as JSON number or as a numeric string,
/// e.g. `41.2855` and `"41.2855"`. Web services like Nominatim send
/// coordinates as strings.
pub mod number_or_string {
    use core::fmt;

    use serde::{
        de::{self, Unexpected, Visitor},
        Deserializer, Serializer,
    };

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NumberVisitor;

        impl<'de> Visitor<'de> for NumberVisitor {
            type Value = f64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number or a string containing a number")
            }

            fn visit_f64<E>(self, value: f64) -> Result<f64, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            fn visit_i64<E>(self, value: i64) -> Result<f64, E>
            where
                E: de::Error,
            {
                Ok(value as f64)
            }

            fn visit_u64<E>(self, value: u64) -> Result<f64, E>
            where
                E: de::Error,
            {
                Ok(value as f64)
            }

            fn visit_str<E>(self, value: &str) -> Result<f64, E>
            where
                E: de::Error,
            {
                value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .ok_or_else(|| {
                        de::Error::invalid_value(Unexpected::Str(value), &self)
                    })
            }
        }

        deserializer.deserialize_any(NumberVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Point {
        #[serde(with = "super::number_or_string")]
        lat: f64,
    }

    #[test]
    fn reads_strings_and_numbers() {
        let from_str: Point = serde_json::from_str(r#"{"lat": "41.2855"}"#).unwrap();
        let from_num: Point = serde_json::from_str(r#"{"lat": 41.2855}"#).unwrap();
        let from_int: Point = serde_json::from_str(r#"{"lat": -3}"#).unwrap();
        assert_eq!(from_str.lat, 41.2855);
        assert_eq!(from_num.lat, 41.2855);
        assert_eq!(from_int.lat, -3.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Point>(r#"{"lat": "north"}"#).is_err());
        assert!(serde_json::from_str::<Point>(r#"{"lat": "NaN"}"#).is_err());
        assert!(serde_json::from_str::<Point>(r#"{"lat": null}"#).is_err());
    }
}
