mod table;

use table::Table;

use crate::cli::backend_api;
use crate::config::Config;
use crate::die;
use crate::ollama::api::Tag;
use crate::{ListingFormat, ModelsArgs};

#[derive(serde::Serialize)]
struct ModelRow {
    name: String,
    parameters: String,
    quantization: String,
    size: u64,
}

impl From<Tag> for ModelRow {
    fn from(value: Tag) -> Self {
        ModelRow {
            name: value.name,
            parameters: value.details.parameter_size,
            quantization: value.details.quantization_level,
            size: value.size,
        }
    }
}

fn models_table(models: &[ModelRow]) -> Table {
    let mut tab = Table::new(vec!["MODEL", "PARAMETERS", "QUANTIZATION", "SIZE"]);

    for model in models {
        tab.add_row(vec![
            model.name.clone(),
            model.parameters.clone(),
            model.quantization.clone(),
            model.size.to_string(),
        ]);
    }

    tab
}

fn format_output(models: Vec<ModelRow>, format: ListingFormat) {
    match format {
        ListingFormat::Json => {
            let output =
                serde_json::to_string_pretty(&models).expect("failed to serialize model listing");

            println!("{}", output);
        }
        ListingFormat::Table => {
            print!("{}", models_table(&models));
        }
    }
}

pub(crate) async fn models_cmd(config: &Config, args: &ModelsArgs) {
    let api = backend_api(config);

    let tags = match api.tags().await {
        Ok(tags) => tags,
        Err(err) => die!("failed to list models: {}", err),
    };

    let models: Vec<ModelRow> = tags.into_iter().map(|t| t.into()).collect();

    format_output(models, args.format);
}
