use crate::server::router::GvState;
use crate::service::{CheckinOutcome, CrmSync};
use crate::utils::html::escape;
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use gv_schema::CheckinQuery;
use tracing::debug;

/// Router fallback: any GET whose path contains `/checkin/` is a QR scan, everything else is 404.
pub async fn checkin_fallback(
    State(state): State<GvState>,
    method: Method,
    uri: Uri,
    query: Result<Query<CheckinQuery>, QueryRejection>,
) -> Response {
    if !uri.path().contains("/checkin/") || !matches!(method, Method::GET | Method::HEAD) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let query = match query {
        Ok(Query(q)) => q,
        Err(e) => {
            debug!(error = %e, "Unreadable check-in query; treating as empty");
            CheckinQuery::default()
        }
    };

    let outcome = state.services.checkin.handle(&query).await;
    Html(render_confirmation(&outcome)).into_response()
}

fn render_confirmation(outcome: &CheckinOutcome) -> String {
    let fields = &outcome.fields;
    let row = |label: &str, value: Option<&String>| match value {
        Some(v) => format!("<tr><th>{label}</th><td>{}</td></tr>", escape(v)),
        None => String::new(),
    };

    let event_line = match (&outcome.event, outcome.recorded) {
        (Some(event), Some(count)) => format!(
            "<p>Asistencia registrada en <strong>{}</strong> ({count} asistentes).</p>",
            escape(&event.title)
        ),
        _ => "<p>No se encontró el evento; la asistencia no quedó registrada localmente.</p>"
            .to_string(),
    };
    let crm_line = match &outcome.crm {
        CrmSync::Synced => "<p>Asistencia marcada en el CRM.</p>".to_string(),
        CrmSync::Skipped(reason) => format!("<p class=\"muted\">CRM: {}.</p>", escape(reason)),
        CrmSync::Failed(_) => {
            "<p class=\"muted\">CRM: no se pudo sincronizar la asistencia.</p>".to_string()
        }
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Check-in</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 32rem; padding: 0 1rem; }}
h1 {{ color: #2a9d5c; }}
th {{ text-align: left; padding-right: 1rem; }}
.muted {{ color: #666; }}
</style>
</head>
<body>
<h1>Check-in confirmado</h1>
<table>
{nombre}{empresa}{cargo}{evento}{ubicacion}{fecha}
</table>
{event_line}
{crm_line}
</body>
</html>
"#,
        nombre = row("Nombre", fields.nombre.as_ref()),
        empresa = row("Empresa", fields.empresa.as_ref()),
        cargo = row("Cargo", fields.cargo.as_ref()),
        evento = row("Evento", fields.evento.as_ref()),
        ubicacion = row("Ubicación", fields.ubicacion.as_ref()),
        fecha = row("Fecha", fields.fecha.as_ref()),
    )
}
