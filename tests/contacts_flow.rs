use ldb::{Ldb, LdbConfig, MemoryCache, QueryOptions, RowSet, SqliteExecutor};
use std::io::Write;
use std::sync::Arc;

const SCHEMA: &str = "
    CREATE TABLE contacto (
        id_contacto INTEGER PRIMARY KEY,
        id_grupo TEXT NOT NULL,
        estado TEXT NOT NULL
    );
    CREATE TABLE contacto_telefono (
        id_contacto INTEGER NOT NULL,
        numero TEXT NOT NULL
    );
    INSERT INTO contacto VALUES (1, 'g1', 'activo'), (2, 'g1', 'inactivo'), (3, 'g2', 'activo');
    INSERT INTO contacto_telefono VALUES (1, '555-0001'), (1, '555-0002'), (2, '555-0003'), (3, '555-0004');
";

/// Phone numbers of the active contacts in a group, cached per group.
fn numbers_for_group(ldb: &Ldb, id_grupo: &str) -> ldb::Result<RowSet> {
    let query = format!(
        "SELECT contacto_telefono.numero
           FROM contacto, contacto_telefono
          WHERE contacto.id_contacto = contacto_telefono.id_contacto
            AND contacto.id_grupo = '{}'
            AND contacto.estado = 'activo'
          ORDER BY contacto_telefono.numero",
        id_grupo
    );
    ldb.query(&query, &QueryOptions::cached("contacts"))
}

fn setup() -> Ldb {
    let db = SqliteExecutor::open_in_memory().expect("open sqlite");
    db.execute_batch(SCHEMA).expect("schema");
    Ldb::new(Arc::new(db), Arc::new(MemoryCache::new()))
}

#[test]
fn group_lookup_is_cached_per_query() {
    let ldb = setup();

    let g1 = numbers_for_group(&ldb, "g1").unwrap();
    let numbers: Vec<&str> = g1.iter().filter_map(|r| r.get("numero")).collect();
    assert_eq!(numbers, vec!["555-0001", "555-0002"]);

    let g2 = numbers_for_group(&ldb, "g2").unwrap();
    assert_eq!(g2.len(), 1);

    assert_eq!(numbers_for_group(&ldb, "g1").unwrap(), g1);
    assert_eq!(numbers_for_group(&ldb, "g2").unwrap(), g2);

    let stats = ldb.stats();
    assert_eq!(stats.db_reads, 2);
    assert_eq!(stats.cache_hits, 2);
    assert_eq!(stats.hit_rate(), 0.5);
}

#[test]
fn from_config_with_cache_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("contacts.db");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"DbPath": {}, "CacheEnabled": false, "DefaultTtlSecs": 60}}"#,
        serde_json::to_string(&db_path).unwrap()
    )
    .unwrap();

    let config = LdbConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();
    let ldb = Ldb::from_config(&config).unwrap();

    ldb.execute("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)").unwrap();
    assert_eq!(ldb.execute("INSERT INTO kv VALUES ('a', '1')").unwrap(), 1);

    let opts = QueryOptions::cached("kv");
    assert_eq!(ldb.query_value("SELECT v FROM kv WHERE k = 'a'", &opts).unwrap(), "1");
    assert_eq!(ldb.query_value("SELECT v FROM kv WHERE k = 'a'", &opts).unwrap(), "1");

    // A disabled cache never hits, so both reads went to the database.
    assert_eq!(ldb.stats().db_reads, 2);
}
