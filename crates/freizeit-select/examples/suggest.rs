use std::io::{self, Read};

use freizeit_core::Catalogue;
use freizeit_select::{select, Constraint, SelectionRequest};
use std::fs::File;
use std::io::BufReader;

/// Liest einen Request (JSON) von stdin und zieht einen Vorschlag aus den
/// als Argumente übergebenen Pools.
///
/// Aufruf: `suggest <indoor.jsonl> <outdoor.jsonl>`; stdin z. B.
/// `{"good_weather": true, "available_minutes": 60, "excluded": []}` und
/// optional `"constraint": {"kind": "different_from", "category": "Cook"}`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let indoor_path = std::env::args().nth(1).ok_or("missing indoor pool path")?;
    let outdoor_path = std::env::args().nth(2).ok_or("missing outdoor pool path")?;

    let indoor = Catalogue::read_pool(BufReader::new(File::open(indoor_path)?))?;
    let outdoor = Catalogue::read_pool(BufReader::new(File::open(outdoor_path)?))?;
    let catalogue = Catalogue::new(indoor, outdoor);

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    #[derive(serde::Deserialize)]
    struct Input {
        #[serde(flatten)]
        request: SelectionRequest,
        #[serde(default)]
        constraint: Option<Constraint>,
    }

    let input: Input = if input.trim().is_empty() {
        Input {
            request: SelectionRequest::new(false, 60),
            constraint: None,
        }
    } else {
        serde_json::from_str(&input)?
    };

    let constraint = input.constraint.unwrap_or(Constraint::Any);
    match select(&catalogue, &input.request, &constraint) {
        Some(activity) => println!("{}", serde_json::to_string_pretty(activity)?),
        None => println!("no-match"),
    }

    Ok(())
}
