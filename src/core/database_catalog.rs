use crate::utils::error::{ProvisionError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 內建資料庫類型（不經模板目錄）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatabaseType {
    Postgres,
    Mysql,
    Mongodb,
    Redis,
    Minio,
    Sqlite3,
    Pocketbase,
    Clickhouse,
    Mariadb,
    Pgvector,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub source: &'static str,
    pub default_name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub variables: &'static [(&'static str, &'static str)],
    /// 有值時才建立 TCP proxy
    pub port: Option<u16>,
    pub mount_path: &'static str,
}

static POSTGRES: DatabaseConfig = DatabaseConfig {
    source: "railwayapp-templates/postgres-ssl:15",
    default_name: "PostgreSQL",
    description: "PostgreSQL database service",
    category: "SQL Databases",
    variables: &[
        (
            "POSTGRES_URL",
            "jdbc:postgresql://${{POSTGRESUSER}}:${{POSTGRESPASSWORD}}@${{RAILWAY_TCP_PROXY_DOMAIN}}:${{RAILWAY_TCP_PROXY_PORT}}/${{POSTGRESDB}}",
        ),
        ("POSTGRESUSER", "postgres-user"),
        ("POSTGRESPASSWORD", "postgres-password"),
        ("POSTGRESDB", "postgres-db"),
    ],
    port: Some(5432),
    mount_path: "/var/lib/postgresql/data",
};

static MYSQL: DatabaseConfig = DatabaseConfig {
    source: "mysql:latest",
    default_name: "MySQL",
    description: "MySQL database service",
    category: "SQL Databases",
    variables: &[
        (
            "MYSQL_PUBLIC_URL",
            "mysql://${{MYSQLUSER}}:${{MYSQL_ROOT_PASSWORD}}@${{RAILWAY_TCP_PROXY_DOMAIN}}:${{RAILWAY_TCP_PROXY_PORT}}/${{MYSQL_DATABASE}}",
        ),
        (
            "MYSQL_URL",
            "mysql://${{MYSQLUSER}}:${{MYSQL_ROOT_PASSWORD}}@${{RAILWAY_PRIVATE_DOMAIN}}:3306/${{MYSQL_DATABASE}}",
        ),
        ("MYSQLHOST", "${{RAILWAY_PRIVATE_DOMAIN}}"),
        ("MYSQLPORT", "3306"),
        ("MYSQLUSER", "root"),
        ("MYSQLPASSWORD", "mysql-password"),
        ("MYSQLDATABASE", "mysql-db"),
        ("MYSQL_ROOT_PASSWORD", "mysql-password"),
    ],
    port: Some(3306),
    mount_path: "/var/lib/mysql",
};

static MONGODB: DatabaseConfig = DatabaseConfig {
    source: "mongo:6",
    default_name: "MongoDB",
    description: "MongoDB NoSQL database service",
    category: "NoSQL Databases",
    variables: &[],
    port: Some(27017),
    mount_path: "/data/db",
};

static REDIS: DatabaseConfig = DatabaseConfig {
    source: "redis:7",
    default_name: "Redis",
    description: "Redis in-memory data store",
    category: "In-Memory Stores",
    variables: &[],
    port: Some(6379),
    mount_path: "/data",
};

static MINIO: DatabaseConfig = DatabaseConfig {
    source: "minio:latest",
    default_name: "MinIO",
    description: "MinIO object storage service",
    category: "Object Storage",
    variables: &[],
    port: Some(9000),
    mount_path: "/data",
};

static SQLITE3: DatabaseConfig = DatabaseConfig {
    source: "sqlite:latest",
    default_name: "SQLite",
    description: "SQLite relational database",
    category: "SQL Databases",
    variables: &[],
    port: None,
    mount_path: "/data",
};

static POCKETBASE: DatabaseConfig = DatabaseConfig {
    source: "pocketbase/pocketbase:latest",
    default_name: "PocketBase",
    description: "PocketBase lightweight, open-source, self-hosted backend",
    category: "SQL Databases",
    variables: &[],
    port: None,
    mount_path: "/pb_data",
};

static CLICKHOUSE: DatabaseConfig = DatabaseConfig {
    source: "clickhouse/clickhouse-server:23",
    default_name: "ClickHouse",
    description: "ClickHouse column-oriented database",
    category: "Analytics Databases",
    variables: &[],
    port: Some(8123),
    mount_path: "/var/lib/clickhouse",
};

static MARIADB: DatabaseConfig = DatabaseConfig {
    source: "mariadb:10",
    default_name: "MariaDB",
    description: "MariaDB relational database",
    category: "SQL Databases",
    variables: &[],
    port: Some(3306),
    mount_path: "/var/lib/mysql",
};

static PGVECTOR: DatabaseConfig = DatabaseConfig {
    source: "postgres:14",
    default_name: "PGVector",
    description: "PGVector vector database",
    category: "Vector Databases",
    variables: &[],
    port: Some(5432),
    mount_path: "/var/lib/postgresql/data",
};

impl DatabaseType {
    pub const ALL: [DatabaseType; 10] = [
        DatabaseType::Postgres,
        DatabaseType::Mysql,
        DatabaseType::Mongodb,
        DatabaseType::Redis,
        DatabaseType::Minio,
        DatabaseType::Sqlite3,
        DatabaseType::Pocketbase,
        DatabaseType::Clickhouse,
        DatabaseType::Mariadb,
        DatabaseType::Pgvector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::Postgres => "postgres",
            DatabaseType::Mysql => "mysql",
            DatabaseType::Mongodb => "mongodb",
            DatabaseType::Redis => "redis",
            DatabaseType::Minio => "minio",
            DatabaseType::Sqlite3 => "sqlite3",
            DatabaseType::Pocketbase => "pocketbase",
            DatabaseType::Clickhouse => "clickhouse",
            DatabaseType::Mariadb => "mariadb",
            DatabaseType::Pgvector => "pgvector",
        }
    }

    pub fn config(&self) -> &'static DatabaseConfig {
        database_config(*self)
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        DatabaseType::ALL
            .iter()
            .copied()
            .find(|db| db.as_str() == key)
            .ok_or_else(|| ProvisionError::UnsupportedDatabaseType {
                value: s.to_string(),
            })
    }
}

pub fn database_config(db: DatabaseType) -> &'static DatabaseConfig {
    match db {
        DatabaseType::Postgres => &POSTGRES,
        DatabaseType::Mysql => &MYSQL,
        DatabaseType::Mongodb => &MONGODB,
        DatabaseType::Redis => &REDIS,
        DatabaseType::Minio => &MINIO,
        DatabaseType::Sqlite3 => &SQLITE3,
        DatabaseType::Pocketbase => &POCKETBASE,
        DatabaseType::Clickhouse => &CLICKHOUSE,
        DatabaseType::Mariadb => &MARIADB,
        DatabaseType::Pgvector => &PGVECTOR,
    }
}

/// 依分類整理內建資料庫類型
pub fn list_database_types() -> BTreeMap<&'static str, Vec<(DatabaseType, &'static DatabaseConfig)>> {
    let mut categorized: BTreeMap<&'static str, Vec<(DatabaseType, &'static DatabaseConfig)>> =
        BTreeMap::new();

    for db in DatabaseType::ALL {
        let config = database_config(db);
        categorized.entry(config.category).or_default().push((db, config));
    }

    categorized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_type_parsing() {
        assert_eq!("postgres".parse::<DatabaseType>().unwrap(), DatabaseType::Postgres);
        assert_eq!(" Redis ".parse::<DatabaseType>().unwrap(), DatabaseType::Redis);
        assert!(matches!(
            "oracle".parse::<DatabaseType>(),
            Err(ProvisionError::UnsupportedDatabaseType { .. })
        ));
    }

    #[test]
    fn test_every_type_round_trips_through_its_key() {
        for db in DatabaseType::ALL {
            assert_eq!(db.as_str().parse::<DatabaseType>().unwrap(), db);
            assert!(!db.config().source.is_empty());
            assert!(db.config().mount_path.starts_with('/'));
        }
    }

    #[test]
    fn test_list_database_types_groups_by_category() {
        let categorized = list_database_types();

        let sql: Vec<DatabaseType> = categorized["SQL Databases"].iter().map(|(db, _)| *db).collect();
        assert_eq!(
            sql,
            vec![
                DatabaseType::Postgres,
                DatabaseType::Mysql,
                DatabaseType::Sqlite3,
                DatabaseType::Pocketbase,
                DatabaseType::Mariadb
            ]
        );
        assert_eq!(categorized.values().map(Vec::len).sum::<usize>(), DatabaseType::ALL.len());
    }

    #[test]
    fn test_sqlite_declares_no_port() {
        assert!(DatabaseType::Sqlite3.config().port.is_none());
        assert_eq!(DatabaseType::Postgres.config().port, Some(5432));
    }
}
