use crate::config::TransformConfig;
use crate::domain::names::{self, transform_file};

pub fn run(config: TransformConfig) -> anyhow::Result<()> {
    let year = names::resolve_year(config.year, names::current_year())?;
    let written = transform_file(&config.input, &config.output, year)?;

    tracing::info!(
        input = %config.input.display(),
        output = %config.output.display(),
        year,
        written,
        "Dataset written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_zero_means_current_year() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "name\nIvy\n").unwrap();

        run(TransformConfig {
            input,
            output: output.clone(),
            year: Some(0),
        })
        .unwrap();

        let written = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            written,
            format!("year,id,name\n{},1,Ivy\n", names::current_year())
        );
    }

    #[test]
    fn test_negative_year_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(TransformConfig {
            input: dir.path().join("raw.csv"),
            output: dir.path().join("out.csv"),
            year: Some(-1),
        })
        .unwrap_err();
        assert!(err.to_string().contains("year must be >= 0"));
    }
}
