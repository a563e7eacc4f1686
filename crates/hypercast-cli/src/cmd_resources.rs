use anyhow::Result;
use serde::Serialize;

use crate::app::App;

#[derive(Serialize, Debug, PartialEq, Eq)]
struct ResourceRow {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(rename = "collectionUrl")]
    collection_url: String,
}

fn rows(app: &App) -> Vec<ResourceRow> {
    app.renderer
        .registry()
        .resources()
        .into_iter()
        .map(|info| ResourceRow {
            collection_url: format!("/p/{}", info.name),
            type_name: info.model_type.short_name().to_string(),
            name: info.name,
        })
        .collect()
}

pub fn run(app: &App, json: bool, pretty: bool) -> Result<()> {
    let rows = rows(app);
    if json {
        let out = if pretty {
            serde_json::to_string_pretty(&rows)?
        } else {
            serde_json::to_string(&rows)?
        };
        println!("{}", out);
        return Ok(());
    }
    for row in rows {
        println!("{:<10} {:<16} {}", row.name, row.type_name, row.collection_url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypercast::v1::Config;

    #[test]
    fn test_rows_follow_registration_order() {
        let app = App::new(Config::default()).unwrap();
        let rows = rows(&app);
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[1],
            ResourceRow {
                name: "blogs".into(),
                type_name: "BlogPosting".into(),
                collection_url: "/p/blogs".into(),
            }
        );
        assert_eq!(rows[3].type_name, "AggregateRating");
    }
}
