use freizeit_core::Catalogue;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1);
    let reader: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(File::open(p)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let pool = Catalogue::read_pool(reader)?;
    let catalogue = Catalogue::new(pool, Vec::new());

    for activity in catalogue.indoor() {
        println!(
            "{}\t{}\t{} / {}",
            activity.estimated_minutes, activity.name, activity.category, activity.subcategory
        );
    }

    Ok(())
}
