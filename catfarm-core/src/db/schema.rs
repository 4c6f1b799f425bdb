pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cat (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    age INTEGER CHECK (age IS NULL OR age >= 0),
    status TEXT NOT NULL,
    temperment TEXT,
    photoUrls TEXT
);

CREATE INDEX IF NOT EXISTS idx_cat_status ON cat(status);
"#;
