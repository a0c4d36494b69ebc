use std::fs;
use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use layerscope::cli::{self, AffectedArgs, Command, InitConfigArgs, NamesArgs, RenameArgs, UserArgs};
use layerscope::domain::AffectedTable;
use layerscope::infra::config::{CatalogSettings, Settings, TomlSettingsStore};

const LAYER: &str = r##"{
  "kind": "carto",
  "options": {
    "query": "SELECT * FROM table_name, other_table",
    "table_name": "table_name",
    "tile_style": "#table_name { color:red; }"
  }
}"##;

const CATALOG: &str = r#"[
  {"id": "00000000-0000-0000-0000-000000000001", "name": "table_name", "owner": {"username": "owner", "organization": "acme"}},
  {"id": "00000000-0000-0000-0000-000000000002", "name": "other_table", "owner": {"username": "owner", "organization": "acme"}, "privacy": "public"},
  {"id": "00000000-0000-0000-0000-000000000003", "name": "unused", "owner": {"username": "owner", "organization": "acme"}}
]"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("layer.json"), LAYER).unwrap();
        fs::write(dir.path().join("catalog.json"), CATALOG).unwrap();
        Self { dir }
    }

    fn layer(&self) -> PathBuf {
        self.dir.path().join("layer.json")
    }

    fn catalog(&self) -> PathBuf {
        self.dir.path().join("catalog.json")
    }
}

fn user(name: &str, org: Option<&str>) -> UserArgs {
    UserArgs {
        user: name.to_string(),
        org: org.map(str::to_string),
    }
}

fn names_for_query(username: &str, query: &str) -> String {
    let command = Command::Names(NamesArgs {
        user: user(username, None),
        query: Some(query.to_string()),
        layer: None,
    });
    cli::run(&command, &Settings::default(), None).unwrap()
}

mod names {
    use super::*;

    #[rstest]
    #[case("owner", "SELECT * FROM roads", "owner.roads")]
    #[case("user-x", "SELECT * FROM t", "\"user-x\".t")]
    #[case("user-x", "SELECT * FROM \"t-1\"", "\"user-x\".\"t-1\"")]
    #[case("owner", "select 1", "")]
    fn qualifies_with_acting_user(#[case] username: &str, #[case] query: &str, #[case] expected: &str) {
        assert_eq!(names_for_query(username, query), expected);
    }

    #[test]
    fn multi_statement_query_lists_each_table_once() {
        let output = names_for_query("owner", "select * from t1, t2;select 1;select * from t2");

        insta::assert_snapshot!(output, @r"
        owner.t1
        owner.t2
        ");
    }

    #[test]
    fn layer_file_includes_table_name_option() {
        let workspace = Workspace::new();
        let command = Command::Names(NamesArgs {
            user: user("owner", None),
            query: None,
            layer: Some(workspace.layer()),
        });

        let output = cli::run(&command, &Settings::default(), None).unwrap();

        insta::assert_snapshot!(output, @r"
        owner.other_table
        owner.table_name
        ");
    }

    #[test]
    fn blank_user_is_rejected() {
        let command = Command::Names(NamesArgs {
            user: user("", None),
            query: Some("SELECT * FROM roads".to_string()),
            layer: None,
        });

        assert!(cli::run(&command, &Settings::default(), None).is_err());
    }
}

mod affected {
    use super::*;

    fn affected_names(output: &str) -> Vec<String> {
        let tables: Vec<AffectedTable> = serde_json::from_str(output).unwrap();
        tables
            .iter()
            .map(|t| format!("{}.{}", t.schema, t.name))
            .collect()
    }

    #[test]
    fn prints_visible_tables_sorted() {
        let workspace = Workspace::new();
        let command = Command::Affected(AffectedArgs {
            user: user("colleague", Some("acme")),
            layer: workspace.layer(),
            catalog: Some(workspace.catalog()),
        });

        let output = cli::run(&command, &Settings::default(), None).unwrap();

        assert_eq!(
            affected_names(&output),
            vec!["owner.other_table", "owner.table_name"]
        );
    }

    #[test]
    fn other_organization_sees_nothing() {
        let workspace = Workspace::new();
        let command = Command::Affected(AffectedArgs {
            user: user("stranger", Some("globex")),
            layer: workspace.layer(),
            catalog: Some(workspace.catalog()),
        });

        let output = cli::run(&command, &Settings::default(), None).unwrap();

        assert!(affected_names(&output).is_empty());
    }

    #[test]
    fn catalog_falls_back_to_settings() {
        let workspace = Workspace::new();
        let settings = Settings {
            catalog: CatalogSettings {
                path: Some(workspace.catalog()),
            },
            ..Settings::default()
        };
        let command = Command::Affected(AffectedArgs {
            user: user("owner", None),
            layer: workspace.layer(),
            catalog: None,
        });

        let output = cli::run(&command, &settings, None).unwrap();

        assert_eq!(affected_names(&output).len(), 2);
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let workspace = Workspace::new();
        let command = Command::Affected(AffectedArgs {
            user: user("owner", None),
            layer: workspace.layer(),
            catalog: None,
        });

        let error = cli::run(&command, &Settings::default(), None).unwrap_err();

        insta::assert_snapshot!(error.to_string(), @"no catalog given: pass --catalog or set catalog.path");
    }
}

mod rename {
    use super::*;

    fn rename_args(workspace: &Workspace, from: &str, to: &str, write: bool) -> RenameArgs {
        RenameArgs {
            layer: workspace.layer(),
            from: from.to_string(),
            to: to.to_string(),
            schema: None,
            write,
        }
    }

    #[test]
    fn prints_renamed_layer() {
        let workspace = Workspace::new();
        let command = Command::Rename(rename_args(&workspace, "table_name", "changed_name", false));

        let output = cli::run(&command, &Settings::default(), None).unwrap();

        insta::assert_snapshot!(output, @r##"
        {
          "kind": "carto",
          "options": {
            "query": "SELECT * FROM changed_name, other_table",
            "table_name": "changed_name",
            "tile_style": "#changed_name { color:red; }"
          }
        }
        "##);
        assert_eq!(fs::read_to_string(workspace.layer()).unwrap(), LAYER);
    }

    #[test]
    fn write_persists_layer() {
        let workspace = Workspace::new();
        let command = Command::Rename(rename_args(&workspace, "table_name", "changed_name", true));

        let output = cli::run(&command, &Settings::default(), None).unwrap();

        insta::assert_snapshot!(output, @"query: renamed, tile_style: renamed, table_name: renamed");
        let saved = fs::read_to_string(workspace.layer()).unwrap();
        assert!(saved.contains("SELECT * FROM changed_name, other_table"));
    }

    #[test]
    fn absent_name_leaves_file_untouched() {
        let workspace = Workspace::new();
        let command = Command::Rename(rename_args(&workspace, "missing", "changed_name", true));

        let output = cli::run(&command, &Settings::default(), None).unwrap();

        insta::assert_snapshot!(output, @"query: unchanged, tile_style: unchanged, table_name: unchanged");
        assert_eq!(fs::read_to_string(workspace.layer()).unwrap(), LAYER);
    }
}

mod init_config {
    use super::*;

    #[test]
    fn writes_default_settings() {
        let workspace = Workspace::new();
        let store = TomlSettingsStore::with_config_dir(workspace.dir.path().join("layerscope"));
        let command = Command::InitConfig(InitConfigArgs { force: false });

        cli::run(&command, &Settings::default(), Some(&store)).unwrap();

        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn existing_file_needs_force() {
        let workspace = Workspace::new();
        let path = workspace.dir.path().join("settings.toml");
        fs::write(&path, "version = 0\n").unwrap();
        let store = TomlSettingsStore::with_path(path);

        let refused = cli::run(
            &Command::InitConfig(InitConfigArgs { force: false }),
            &Settings::default(),
            Some(&store),
        );
        let forced = cli::run(
            &Command::InitConfig(InitConfigArgs { force: true }),
            &Settings::default(),
            Some(&store),
        );

        assert!(refused.is_err());
        assert!(forced.is_ok());
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn missing_store_is_an_error() {
        let command = Command::InitConfig(InitConfigArgs { force: false });

        let error = cli::run(&command, &Settings::default(), None).unwrap_err();

        insta::assert_snapshot!(error.to_string(), @"no config directory: pass --config");
    }
}
