//! CLI for freizeit.
//!
//! Provides the three suggestion commands (fresh, similar, different) plus accept,
//! wires the catalogue and session files to the selection engine, and derives the
//! good-weather flag from the AEMET municipal forecast after geolocating the user.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use freizeit_core::{Activity, Catalogue, GoodWeatherPolicy, SessionState, WeatherSnapshot};
use freizeit_select::{suggest, suggest_different, suggest_similar, SelectError, SelectionRequest};
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;

const GEOLOCATION_URL: &str = "https://www.googleapis.com/geolocation/v1/geolocate";
const GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const AEMET_BASE_URL: &str = "https://opendata.aemet.es/opendata/api/prediccion/especifica/municipio";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fresh suggestion; starts a new session or continues the stored one
    Suggest {
        /// Available time budget in minutes
        #[arg(long)]
        minutes: u32,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Suggest something in the same category but a different subcategory
    Similar {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Suggest something from a different category
    Different {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Accept the currently shown activity and close it out
    Accept {
        /// Look up nearby venues for the accepted activity
        #[arg(long)]
        places: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Indoor pool (JSONL, one activity per line)
    #[arg(long, default_value = "data/indoor.jsonl")]
    indoor: PathBuf,

    /// Outdoor pool (JSONL, one activity per line)
    #[arg(long, default_value = "data/outdoor.jsonl")]
    outdoor: PathBuf,

    /// Municipality registry (JSONL: id, nombre, latitud, longitud)
    #[arg(long, default_value = "data/municipios.jsonl")]
    municipios: PathBuf,

    /// Path to the session state file
    #[arg(long, default_value = "data/freizeit.session.json")]
    session_file: PathBuf,

    /// AEMET municipality code - skips geolocation
    #[arg(long)]
    municipio: Option<String>,

    /// Skip the weather fetch and assume this flag instead
    #[arg(long, value_enum)]
    assume_weather: Option<WeatherAssumption>,

    /// Wind limit in km/h; stronger wind counts as bad weather
    #[arg(long)]
    wind_limit: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum WeatherAssumption {
    Good,
    Bad,
}

// --- Municipality registry -------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct Municipio {
    /// Registry id, e.g. "id11012"; the AEMET code is the id without its
    /// two-letter prefix.
    id: String,
    nombre: String,
    latitud: f64,
    longitud: f64,
}

fn read_municipios(path: &Path) -> Result<Vec<Municipio>> {
    use std::io::BufRead;
    let file = File::open(path)
        .with_context(|| format!("Failed to open municipality registry {path:?}"))?;
    let mut municipios = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let m: Municipio = serde_json::from_str(&line)
            .with_context(|| format!("Invalid municipality record on line {}", idx + 1))?;
        municipios.push(m);
    }
    Ok(municipios)
}

fn aemet_code(id: &str) -> &str {
    id.get(2..).filter(|rest| !rest.is_empty()).unwrap_or(id)
}

fn find_municipio<'a>(municipios: &'a [Municipio], name: &str) -> Option<&'a Municipio> {
    municipios.iter().find(|m| m.nombre == name)
}

fn nearest_municipio(municipios: &[Municipio], lat: f64, lon: f64) -> Option<&Municipio> {
    municipios.iter().min_by(|a, b| {
        let da = (a.latitud - lat).powi(2) + (a.longitud - lon).powi(2);
        let db = (b.latitud - lat).powi(2) + (b.longitud - lon).powi(2);
        da.total_cmp(&db)
    })
}

// --- Google geolocation & geocoding ----------------------------------------

#[derive(Debug, Deserialize)]
struct GeolocationResponse {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

fn fetch_coordinates(api_key: &str) -> Result<(f64, f64)> {
    let resp = ureq::post(GEOLOCATION_URL)
        .query("key", api_key)
        .timeout(HTTP_TIMEOUT)
        .send_json(serde_json::json!({ "considerIp": true }))
        .context("Geolocation request failed")?;
    let body: GeolocationResponse = resp.into_json()?;
    Ok((body.location.lat, body.location.lng))
}

fn fetch_locality(api_key: &str, lat: f64, lon: f64) -> Result<Option<String>> {
    let resp = ureq::get(GEOCODING_URL)
        .query("latlng", &format!("{lat},{lon}"))
        .query("key", api_key)
        .timeout(HTTP_TIMEOUT)
        .call()
        .context("Reverse geocoding request failed")?;
    let body: GeocodeResponse = resp.into_json()?;
    Ok(locality_from_components(&body))
}

/// Picks the most specific administrative name the geocoder offers,
/// in the order locality > level 4 > level 3.
fn locality_from_components(response: &GeocodeResponse) -> Option<String> {
    let components = &response.results.first()?.address_components;
    for wanted in [
        "locality",
        "administrative_area_level_4",
        "administrative_area_level_3",
    ] {
        if let Some(component) = components
            .iter()
            .find(|c| c.types.iter().any(|t| t == wanted))
        {
            return Some(component.long_name.clone());
        }
    }
    None
}

// --- AEMET forecast ---------------------------------------------------------

/// First-stage AEMET response: the payload lives behind the `datos` URL.
#[derive(Debug, Deserialize)]
struct AemetEnvelope {
    datos: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AemetDailyForecast {
    prediccion: AemetDailyPrediccion,
}

#[derive(Debug, Deserialize)]
struct AemetDailyPrediccion {
    dia: Vec<AemetDailyDay>,
}

#[derive(Debug, Deserialize)]
struct AemetDailyDay {
    #[serde(default)]
    temperatura: Option<AemetTemperatura>,
    #[serde(rename = "probPrecipitacion", default)]
    prob_precipitacion: Vec<AemetPeriodo<u8>>,
    #[serde(rename = "estadoCielo", default)]
    estado_cielo: Vec<AemetEstadoCielo>,
    #[serde(default)]
    viento: Vec<AemetViento>,
}

#[derive(Debug, Deserialize)]
struct AemetTemperatura {
    maxima: Option<f32>,
    minima: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct AemetPeriodo<T> {
    periodo: Option<String>,
    value: Option<T>,
}

#[derive(Debug, Deserialize)]
struct AemetEstadoCielo {
    periodo: Option<String>,
    #[serde(default)]
    descripcion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AemetViento {
    periodo: Option<String>,
    velocidad: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct AemetHourlyForecast {
    prediccion: AemetHourlyPrediccion,
}

#[derive(Debug, Deserialize)]
struct AemetHourlyPrediccion {
    dia: Vec<AemetHourlyDay>,
}

#[derive(Debug, Deserialize)]
struct AemetHourlyDay {
    #[serde(default)]
    temperatura: Vec<AemetPeriodo<f32>>,
}

/// Six-hour forecast block containing the given hour, AEMET period syntax.
fn time_block(hour: u8) -> &'static str {
    match hour {
        0..=5 => "00-06",
        6..=11 => "06-12",
        12..=17 => "12-18",
        _ => "18-24",
    }
}

fn fetch_aemet_payload(api_key: &str, kind: &str, code: &str) -> Result<String> {
    let mut target = url::Url::parse(AEMET_BASE_URL).context("Invalid AEMET base URL")?;
    target
        .path_segments_mut()
        .map_err(|()| anyhow::anyhow!("AEMET base URL cannot be a base"))?
        .push(kind)
        .push(code);

    let resp = ureq::get(target.as_str())
        .set("api_key", api_key)
        .timeout(HTTP_TIMEOUT)
        .call()
        .with_context(|| format!("AEMET {kind} forecast request failed"))?;
    let envelope: AemetEnvelope = resp.into_json()?;
    let datos = envelope
        .datos
        .context("AEMET response is missing the 'datos' URL")?;

    let payload = ureq::get(&datos)
        .timeout(HTTP_TIMEOUT)
        .call()
        .context("Failed to fetch AEMET forecast payload")?
        .into_string()?;
    Ok(payload)
}

fn snapshot_from_daily(day: &AemetDailyDay, hour: u8) -> WeatherSnapshot {
    let block = time_block(hour);
    let rain_probability = day
        .prob_precipitacion
        .iter()
        .find(|p| p.periodo.as_deref() == Some(block))
        .and_then(|p| p.value);
    let wind_speed = day
        .viento
        .iter()
        .find(|v| v.periodo.as_deref() == Some(block))
        .and_then(|v| v.velocidad);
    WeatherSnapshot {
        current_temp: None,
        max_temp: day.temperatura.as_ref().and_then(|t| t.maxima),
        min_temp: day.temperatura.as_ref().and_then(|t| t.minima),
        sky_state: most_frequent_sky_state(&day.estado_cielo),
        wind_speed,
        rain_probability,
    }
}

/// Most frequent non-empty sky description across the day's blocks.
fn most_frequent_sky_state(states: &[AemetEstadoCielo]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for state in states {
        let Some(desc) = state.descripcion.as_deref().filter(|d| !d.is_empty()) else {
            continue;
        };
        match counts.iter_mut().find(|(d, _)| *d == desc) {
            Some((_, n)) => *n += 1,
            None => counts.push((desc, 1)),
        }
    }
    counts
        .into_iter()
        .max_by_key(|&(_, n)| n)
        .map(|(d, _)| d.to_string())
}

fn current_temp_from_hourly(day: &AemetHourlyDay, hour: u8) -> Option<f32> {
    let hour = format!("{hour:02}");
    day.temperatura
        .iter()
        .find(|t| t.periodo.as_deref() == Some(hour.as_str()))
        .and_then(|t| t.value)
}

fn fetch_weather(api_key: &str, code: &str) -> Result<WeatherSnapshot> {
    let hour = current_hour();

    let daily_payload = fetch_aemet_payload(api_key, "diaria", code)?;
    let daily: Vec<AemetDailyForecast> =
        serde_json::from_str(&daily_payload).context("Unexpected AEMET daily payload shape")?;
    let day = daily
        .first()
        .and_then(|f| f.prediccion.dia.first())
        .context("AEMET daily payload has no forecast day")?;
    let mut snapshot = snapshot_from_daily(day, hour);

    // The hourly forecast only refines current_temp; its absence is not an error.
    match fetch_aemet_payload(api_key, "horaria", code) {
        Ok(hourly_payload) => {
            if let Ok(hourly) = serde_json::from_str::<Vec<AemetHourlyForecast>>(&hourly_payload) {
                if let Some(day) = hourly.first().and_then(|f| f.prediccion.dia.first()) {
                    snapshot.current_temp = current_temp_from_hourly(day, hour);
                }
            }
        }
        Err(e) => eprintln!("Warning: hourly forecast unavailable: {e}"),
    }

    Ok(snapshot)
}

fn current_hour() -> u8 {
    OffsetDateTime::now_utc().hour()
}

// --- Weather flag derivation -------------------------------------------------

/// Resolves the good-weather flag for this invocation. Every failure along
/// the chain degrades to an all-unknown snapshot, which the pessimistic
/// policy maps to bad weather; selection always proceeds.
fn resolve_weather(common: &CommonArgs) -> (bool, WeatherSnapshot) {
    let policy = GoodWeatherPolicy {
        wind_limit_kmh: common.wind_limit,
        ..GoodWeatherPolicy::default()
    };

    if let Some(assumption) = common.assume_weather {
        return (assumption == WeatherAssumption::Good, WeatherSnapshot::unknown());
    }

    let snapshot = match try_fetch_snapshot(common) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Warning: weather unavailable, assuming bad weather: {e:#}");
            WeatherSnapshot::unknown()
        }
    };
    (policy.is_good(&snapshot), snapshot)
}

fn try_fetch_snapshot(common: &CommonArgs) -> Result<WeatherSnapshot> {
    let aemet_key = env::var("AEMET_API_KEY").context("AEMET_API_KEY env var is required")?;

    let code = match &common.municipio {
        Some(code) => code.clone(),
        None => locate_municipio(common)?,
    };

    fetch_weather(&aemet_key, &code)
}

fn locate_municipio(common: &CommonArgs) -> Result<String> {
    let google_key = env::var("GOOGLE_API_KEY")
        .context("GOOGLE_API_KEY env var is required for geolocation (or pass --municipio)")?;
    let municipios = read_municipios(&common.municipios)?;

    let (lat, lon) = fetch_coordinates(&google_key)?;
    let municipio = match fetch_locality(&google_key, lat, lon)? {
        Some(name) => find_municipio(&municipios, &name)
            .or_else(|| nearest_municipio(&municipios, lat, lon)),
        None => nearest_municipio(&municipios, lat, lon),
    }
    .context("Municipality registry is empty")?;

    println!("Location: {}", municipio.nombre);
    Ok(aemet_code(&municipio.id).to_string())
}

// --- Nearby places ----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    #[serde(default)]
    vicinity: Option<String>,
}

fn fetch_nearby_places(api_key: &str, keyword: &str, lat: f64, lon: f64) -> Result<Vec<Place>> {
    let resp = ureq::get(PLACES_URL)
        .query("location", &format!("{lat},{lon}"))
        .query("radius", "5000")
        .query("keyword", keyword)
        .query("key", api_key)
        .timeout(HTTP_TIMEOUT)
        .call()
        .context("Places request failed")?;
    let body: PlacesResponse = resp.into_json()?;
    Ok(body.results.into_iter().take(5).collect())
}

// --- Rendering & command plumbing -------------------------------------------

fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}min")
    } else {
        format!("{rest}min")
    }
}

fn print_activity(activity: &Activity) {
    println!("Suggestion: {}", activity.name);
    println!(
        "  Category: {} / {}",
        activity.category, activity.subcategory
    );
    println!(
        "  Estimated time: {}",
        format_minutes(activity.estimated_minutes)
    );
    if let Some(hint) = &activity.hint {
        println!("  Hint: {hint}");
    }
}

fn print_snapshot(snapshot: &WeatherSnapshot, good: bool) {
    if let Some(sky) = &snapshot.sky_state {
        println!("Sky: {sky}");
    }
    if let Some(rain) = snapshot.rain_probability {
        println!("Rain probability: {rain}%");
    }
    if let Some(temp) = snapshot.current_temp {
        println!("Temperature: {temp}°C");
    }
    println!(
        "{}",
        if good {
            "Good weather - outdoor activities are in."
        } else {
            "Bad weather (or no data) - staying indoors."
        }
    );
}

fn load_catalogue(common: &CommonArgs) -> Result<Catalogue> {
    let indoor = File::open(&common.indoor)
        .with_context(|| format!("Failed to open indoor pool {:?}", common.indoor))?;
    let outdoor = File::open(&common.outdoor)
        .with_context(|| format!("Failed to open outdoor pool {:?}", common.outdoor))?;
    let indoor = Catalogue::read_pool(BufReader::new(indoor))
        .context("Failed to parse indoor pool")?;
    let outdoor = Catalogue::read_pool(BufReader::new(outdoor))
        .context("Failed to parse outdoor pool")?;
    Ok(Catalogue::new(indoor, outdoor))
}

fn load_session(common: &CommonArgs, minutes: Option<u32>) -> Result<SessionState> {
    let mut session = match SessionState::load(&common.session_file)
        .context("Failed to load session state")?
    {
        Some(session) => session,
        None => SessionState::new(minutes.unwrap_or(0)),
    };
    if let Some(minutes) = minutes {
        session.available_minutes = minutes;
    }
    Ok(session)
}

fn request_from(session: &SessionState, good_weather: bool) -> SelectionRequest {
    SelectionRequest {
        good_weather,
        available_minutes: session.available_minutes,
        excluded: session.excluded.clone(),
    }
}

fn finish(
    session: &mut SessionState,
    session_file: &Path,
    result: Option<&Activity>,
) -> Result<()> {
    match result {
        Some(activity) => {
            print_activity(activity);
            session.show(activity.clone());
        }
        None => println!("Nothing matches your time budget right now."),
    }
    session
        .save(session_file)
        .context("Failed to save session state")?;
    Ok(())
}

fn run_suggest(minutes: u32, common: &CommonArgs) -> Result<()> {
    let catalogue = load_catalogue(common)?;
    let mut session = load_session(common, Some(minutes))?;
    let (good_weather, snapshot) = resolve_weather(common);
    print_snapshot(&snapshot, good_weather);

    let request = request_from(&session, good_weather);
    let result = suggest(&catalogue, &request);
    finish(&mut session, &common.session_file, result)
}

fn run_similar(common: &CommonArgs) -> Result<()> {
    let catalogue = load_catalogue(common)?;
    let mut session = load_session(common, None)?;
    let current = session
        .current
        .clone()
        .ok_or(SelectError::NoCurrentActivity)?;
    let (good_weather, _) = resolve_weather(common);

    let request = request_from(&session, good_weather);
    let result = suggest_similar(&catalogue, &request, &current.category, &current.subcategory);
    finish(&mut session, &common.session_file, result)
}

fn run_different(common: &CommonArgs) -> Result<()> {
    let catalogue = load_catalogue(common)?;
    let mut session = load_session(common, None)?;
    let current = session
        .current
        .clone()
        .ok_or(SelectError::NoCurrentActivity)?;
    let (good_weather, _) = resolve_weather(common);

    let request = request_from(&session, good_weather);
    let result = suggest_different(&catalogue, &request, &current.category);
    finish(&mut session, &common.session_file, result)
}

fn run_accept(places: bool, common: &CommonArgs) -> Result<()> {
    let mut session = load_session(common, None)?;
    let activity = session.accept().ok_or(SelectError::NoCurrentActivity)?;
    session
        .save(&common.session_file)
        .context("Failed to save session state")?;
    println!("Enjoy: {}", activity.name);

    if places {
        match nearby_places_for(&activity) {
            Ok(found) if found.is_empty() => {
                println!("No nearby venues found for this activity.");
            }
            Ok(found) => {
                println!("Nearby venues:");
                for place in found {
                    match place.vicinity {
                        Some(vicinity) => println!("  {} - {}", place.name, vicinity),
                        None => println!("  {}", place.name),
                    }
                }
            }
            Err(e) => eprintln!("Warning: venue lookup failed: {e:#}"),
        }
    }
    Ok(())
}

fn nearby_places_for(activity: &Activity) -> Result<Vec<Place>> {
    let google_key =
        env::var("GOOGLE_API_KEY").context("GOOGLE_API_KEY env var is required for --places")?;
    let (lat, lon) = fetch_coordinates(&google_key)?;
    fetch_nearby_places(&google_key, &activity.name, lat, lon)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Suggest { minutes, common } => run_suggest(minutes, &common),
        Commands::Similar { common } => run_similar(&common),
        Commands::Different { common } => run_different(&common),
        Commands::Accept { places, common } => run_accept(places, &common),
    }
}
