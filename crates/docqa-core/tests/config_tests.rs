use docqa_core::config::{expand_path, Config, Settings};
use figment::Jail;

#[test]
fn defaults_without_any_config_file() {
    Jail::expect_with(|_jail| {
        let settings = Config::load().expect("load").settings().expect("settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.chunking.chunk_size, 900);
        assert_eq!(settings.chunking.chunk_overlap, 150);
        assert_eq!(settings.chunking.separators, vec!["\n\n", "\n", ". ", " ", ""]);
        assert_eq!((settings.retrieval.min_k, settings.retrieval.default_k, settings.retrieval.max_k), (2, 4, 8));
        Ok(())
    });
}

#[test]
fn env_specific_file_and_env_vars_override_base() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", r#"
            [chunking]
            chunk_size = 500
            chunk_overlap = 50

            [retrieval]
            default_k = 3
        "#)?;
        jail.create_file("config.test.toml", r#"
            [embedding]
            use_fake = true
        "#)?;
        jail.set_env("RUST_ENV", "test");
        jail.set_env("APP_CHUNKING__CHUNK_OVERLAP", "80");

        let config = Config::load().expect("load");
        let settings = config.settings().expect("settings");
        assert_eq!(settings.chunking.chunk_size, 500);
        assert_eq!(settings.chunking.chunk_overlap, 80);
        assert_eq!(settings.retrieval.default_k, 3);
        assert!(settings.embedding.use_fake);
        let k: usize = config.get("retrieval.max_k").expect("get");
        assert_eq!(k, 8);
        Ok(())
    });
}

#[test]
fn overlap_not_smaller_than_size_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n")?;
        let err = Config::load().err().expect("invalid config must fail");
        assert!(format!("{err:#}").contains("chunk_overlap"), "got: {err:#}");
        Ok(())
    });
}

#[test]
fn clamp_k_stays_in_configured_range() {
    let r = Settings::default().retrieval;
    assert_eq!(r.clamp_k(0), 2);
    assert_eq!(r.clamp_k(5), 5);
    assert_eq!(r.clamp_k(50), 8);
}

#[test]
fn expand_path_resolves_env_vars() {
    Jail::expect_with(|jail| {
        jail.set_env("DOCQA_TEST_ROOT", "/srv/docqa");
        assert_eq!(expand_path("${DOCQA_TEST_ROOT}/indexes"), std::path::PathBuf::from("/srv/docqa/indexes"));
        Ok(())
    });
}
