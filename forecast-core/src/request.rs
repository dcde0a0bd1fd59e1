use crate::model::ForecastRequest;

/// Path and query of one forecast call, relative to the API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParts {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RequestParts {
    /// Path with the API key replaced, for logging.
    pub fn redacted_path(&self, api_key: &str) -> String {
        if api_key.is_empty() {
            return self.path.clone();
        }
        self.path.replacen(api_key, "<api-key>", 1)
    }
}

impl ForecastRequest {
    /// Builds `forecast/<key>/<lat>,<lon>[,<time>]` plus its query parameters.
    ///
    /// Nothing is validated here; bad units, languages or exclude lists come
    /// back from the API as an error status.
    pub fn build(&self, api_key: &str) -> RequestParts {
        let mut location = format!("{},{}", self.latitude, self.longitude);
        if let Some(ts) = &self.timestamp {
            location.push(',');
            location.push_str(&ts.canonical());
        }

        let mut query = vec![
            ("units".to_string(), self.units.to_string()),
            ("lang".to_string(), self.language.clone()),
        ];
        if let Some(exclude) = &self.exclude {
            query.push(("exclude".to_string(), exclude.clone()));
        }
        if self.extend_hourly {
            query.push(("extend".to_string(), "hourly".to_string()));
        }

        RequestParts {
            path: format!("forecast/{api_key}/{location}"),
            query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Units;
    use chrono::NaiveDate;

    #[test]
    fn builds_time_machine_path() {
        let req = ForecastRequest::new("37.8267", "-122.423").at("2013-05-06T12:00:00-0400");
        let parts = req.build("KEY");

        assert_eq!(parts.path, "forecast/KEY/37.8267,-122.423,2013-05-06T12:00:00-0400");
        assert_eq!(
            parts.query,
            vec![("units".to_string(), "us".to_string()), ("lang".to_string(), "en".to_string())]
        );
    }

    #[test]
    fn current_forecast_has_no_time_segment() {
        let parts = ForecastRequest::new("43.2672", "-70.8617").build("KEY");
        assert_eq!(parts.path, "forecast/KEY/43.2672,-70.8617");
    }

    #[test]
    fn structured_time_is_canonicalized() {
        let day = NaiveDate::from_ymd_opt(2021, 5, 3).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let parts = ForecastRequest::new("1.5", "2.5").at(day).build("KEY");
        assert!(parts.path.ends_with("1.5,2.5,2021-05-03T00:00:00"));
    }

    #[test]
    fn optional_query_parameters_are_verbatim() {
        let parts = ForecastRequest::new("0", "0")
            .units(Units::Other("bogus".into()))
            .language("xx")
            .exclude("currently,minutely")
            .extend_hourly(true)
            .build("KEY");

        assert_eq!(
            parts.query,
            vec![
                ("units".to_string(), "bogus".to_string()),
                ("lang".to_string(), "xx".to_string()),
                ("exclude".to_string(), "currently,minutely".to_string()),
                ("extend".to_string(), "hourly".to_string()),
            ]
        );
    }

    #[test]
    fn redacted_path_hides_key() {
        let parts = ForecastRequest::new("1", "2").build("s3cret");
        assert_eq!(parts.redacted_path("s3cret"), "forecast/<api-key>/1,2");
    }
}
