use crate::db::PostType;
use crate::error::GvError;
use crate::server::router::GvState;
use crate::utils::html::escape;
use axum::{extract::State, response::Html};
use std::fmt::Write as _;

/// GET /admin/asistentes
///
/// Read-only listing of every event and its attendees.
pub async fn attendees_page(State(state): State<GvState>) -> Result<Html<String>, GvError> {
    let services = &state.services;
    let events = services.posts.list(PostType::Evento).await?;

    let mut body = String::new();
    if events.is_empty() {
        body.push_str("<p>No hay eventos registrados.</p>\n");
    }
    for event in &events {
        let attendees = services.attendees.list(event.id).await?;
        let _ = writeln!(
            body,
            "<h2>{} <small>#{}{}</small></h2>",
            escape(&event.title),
            event.id,
            event
                .zoho_id
                .as_deref()
                .map(|z| format!(" · Zoho {}", escape(z)))
                .unwrap_or_default()
        );
        if attendees.is_empty() {
            body.push_str("<p>Sin asistentes.</p>\n");
            continue;
        }
        body.push_str(
            "<table>\n<tr><th>Nombre</th><th>Empresa</th><th>Cargo</th><th>Fecha</th></tr>\n",
        );
        for a in &attendees {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&a.name),
                escape(&a.company),
                escape(&a.title),
                escape(&a.timestamp)
            );
        }
        let _ = writeln!(body, "</table>\n<p>Total: {}</p>", attendees.len());
    }

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>Asistentes</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; }}
table {{ border-collapse: collapse; margin-bottom: 1rem; }}
th, td {{ border: 1px solid #ccc; padding: .3rem .6rem; text-align: left; }}
</style>
</head>
<body>
<h1>Asistentes por evento</h1>
{body}</body>
</html>
"#
    )))
}
