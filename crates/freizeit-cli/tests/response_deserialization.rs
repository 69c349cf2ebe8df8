use serde::Deserialize;

// The AEMET payload arrives behind a `datos` indirection; these mirror the
// shapes the CLI parses.
#[derive(Deserialize, Debug)]
struct AemetEnvelope {
    datos: Option<String>,
}

#[derive(Deserialize, Debug)]
struct AemetForecast {
    prediccion: Prediccion,
}

#[derive(Deserialize, Debug)]
struct Prediccion {
    dia: Vec<Dia>,
}

#[derive(Deserialize, Debug)]
struct Dia {
    #[serde(rename = "probPrecipitacion", default)]
    prob_precipitacion: Vec<Periodo>,
}

#[derive(Deserialize, Debug)]
struct Periodo {
    periodo: Option<String>,
    value: Option<u8>,
}

#[test]
fn test_aemet_envelope_deserialization() {
    let json = r#"
    {
        "descripcion": "exito",
        "estado": 200,
        "datos": "https://opendata.aemet.es/opendata/sh/abc123",
        "metadatos": "https://opendata.aemet.es/opendata/sh/meta"
    }
    "#;

    let envelope: AemetEnvelope = serde_json::from_str(json).expect("Failed to deserialize");
    assert!(envelope.datos.is_some());
}

#[test]
fn test_aemet_daily_payload_deserialization() {
    let json = r#"
    [
        {
            "nombre": "Cádiz",
            "provincia": "Cádiz",
            "prediccion": {
                "dia": [
                    {
                        "fecha": "2024-05-01T00:00:00",
                        "probPrecipitacion": [
                            {"value": 10, "periodo": "00-24"},
                            {"value": 5, "periodo": "00-06"}
                        ]
                    }
                ]
            }
        }
    ]
    "#;

    let forecast: Vec<AemetForecast> =
        serde_json::from_str(json).expect("Failed to deserialize payload");

    assert_eq!(forecast.len(), 1);
    let day = &forecast[0].prediccion.dia[0];
    assert_eq!(day.prob_precipitacion.len(), 2);
    assert_eq!(day.prob_precipitacion[1].periodo.as_deref(), Some("00-06"));
    assert_eq!(day.prob_precipitacion[1].value, Some(5));
}

#[test]
fn test_aemet_payload_with_null_values_is_tolerated() {
    // Missing fields happen in practice; the snapshot must stay buildable.
    let json = r#"
    [
        {
            "prediccion": {
                "dia": [
                    {"probPrecipitacion": [{"value": null, "periodo": null}]}
                ]
            }
        }
    ]
    "#;

    let forecast: Vec<AemetForecast> =
        serde_json::from_str(json).expect("Failed to deserialize payload");
    let periodo = &forecast[0].prediccion.dia[0].prob_precipitacion[0];
    assert!(periodo.value.is_none());
    assert!(periodo.periodo.is_none());
}
