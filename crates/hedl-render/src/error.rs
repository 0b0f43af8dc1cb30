//! Failures a renderer can raise, one variant per foreign format --
//! `EmitJson`, `EmitYaml`, `EmitXml`, `EmitCsv`, `EmitParquet`, `EmitGraph`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("xml serialization failed: {0}")]
    Xml(String),

    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet serialization failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("the cypher renderer only emits schema-bound records, not bare scalars or maps")]
    GraphRequiresRecord,

    #[error("this value is not a matrix list; {0} requires every row to share one schema")]
    NotMatrix(&'static str),
}

pub type RenderResult<T> = Result<T, RenderError>;
