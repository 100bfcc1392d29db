use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PostQuest {
    pub target: Option<Target>,
    pub reports: Option<Reports>,
    pub run: Option<Run>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub base_url: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Reports {
    pub dir: Option<String>,
    pub kinds: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Run {
    pub only: Option<Vec<String>>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_every_table() {
        let src = r#"
            [target]
            base_url = "http://localhost:3000"

            [reports]
            dir = "out"
            kinds = ["junit"]

            [run]
            only = ["get_all_posts"]
        "#;

        let config: PostQuest = toml::from_str(src).unwrap();

        assert_eq!(
            config.target.unwrap().base_url.as_deref(),
            Some("http://localhost:3000")
        );
        let reports = config.reports.unwrap();
        assert_eq!(reports.dir.as_deref(), Some("out"));
        assert_eq!(reports.kinds.unwrap(), vec!["junit"]);
        assert_eq!(config.run.unwrap().only.unwrap(), vec!["get_all_posts"]);
    }

    #[test]
    fn every_table_is_optional() {
        let config: PostQuest = toml::from_str("").unwrap();

        assert!(config.target.is_none());
        assert!(config.reports.is_none());
        assert!(config.run.is_none());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<PostQuest>("[target]\nbase = \"x\"").is_err());
    }
}
