use std::{
    collections::BTreeMap,
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate, Utc};

use notiflow_console::{
    calendar::{EventItem, filter::upcoming_week, sample_events::sample_events, to_iso_string},
    messages::{DeliveryStatus, Message, OutgoingMessage, Template, status_label},
    reports::{SchoolSummary, school_breakdown},
    storage::config::Config,
    store::AppContext,
    sync::{
        api_client::{HttpConsoleClient, MessagesApi},
        loader,
        outbox::{self, OutboxError},
    },
    ui::month_view::events_by_day,
};

pub const USAGE: &str = "Usage: notiflow-console [--agenda [YYYY/MM/DD]] [--month YYYY/MM] [--upcoming] [--report] [--login EMAIL] [--logout] [--sample] [--send TEXT --to IDS [--groups IDS] [--at YYYY-MM-DDTHH:MM] [--template ID]] [--message ID] [--delete-message ID] [--templates]";

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    Interactive { sample: bool, month: Option<NaiveDate> },
    Agenda { date: NaiveDate, sample: bool },
    Upcoming { sample: bool },
    Report,
    Login(String),
    Logout,
    Send(OutgoingMessage),
    ShowMessage(String),
    DeleteMessage(String),
    Templates,
    Help,
}

pub fn parse_cli_mode<I>(args: I, today: NaiveDate) -> Result<CliMode, String>
where
    I: IntoIterator<Item = String>,
{
    let mut sample = false;
    let mut agenda_date = None;
    let mut month = None;
    let mut upcoming = false;
    let mut report = false;
    let mut login = None;
    let mut logout = false;
    let mut send: Option<OutgoingMessage> = None;
    let mut compose_flags: Vec<&'static str> = Vec::new();
    let mut recipients = Vec::new();
    let mut group_ids = Vec::new();
    let mut scheduled_at = None;
    let mut template_id = None;
    let mut show_message = None;
    let mut delete_message = None;
    let mut templates = false;
    let mut args = args.into_iter().peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sample" => {
                sample = true;
            }
            "--agenda" => {
                let target_date = match args.next_if(|next| !next.starts_with("--")) {
                    Some(date_str) => NaiveDate::parse_from_str(&date_str, "%Y/%m/%d")
                        .map_err(|_| format!("Invalid date '{}'. Use YYYY/MM/DD.", date_str))?,
                    None => today,
                };
                agenda_date = Some(target_date);
            }
            "--month" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--month needs a value. Use YYYY/MM.".to_string())?;
                let first = NaiveDate::parse_from_str(&format!("{}/01", value), "%Y/%m/%d")
                    .map_err(|_| format!("Invalid month '{}'. Use YYYY/MM.", value))?;
                month = Some(first);
            }
            "--upcoming" => {
                upcoming = true;
            }
            "--report" => {
                report = true;
            }
            "--login" => {
                let email = args
                    .next_if(|next| !next.starts_with("--"))
                    .ok_or_else(|| "--login needs an email".to_string())?;
                login = Some(email);
            }
            "--logout" => {
                logout = true;
            }
            "--send" => {
                let content = args
                    .next()
                    .ok_or_else(|| "--send needs the message text".to_string())?;
                send = Some(OutgoingMessage {
                    content,
                    ..OutgoingMessage::default()
                });
            }
            "--to" => {
                recipients.extend(id_list(args.next(), "--to")?);
                compose_flags.push("--to");
            }
            "--groups" => {
                group_ids.extend(id_list(args.next(), "--groups")?);
                compose_flags.push("--groups");
            }
            "--at" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--at needs a value. Use YYYY-MM-DDTHH:MM.".to_string())?;
                scheduled_at = Some(to_iso_string(&value));
                compose_flags.push("--at");
            }
            "--template" => {
                template_id = Some(args.next().ok_or_else(|| "--template needs an id".to_string())?);
                compose_flags.push("--template");
            }
            "--message" => {
                show_message = Some(args.next().ok_or_else(|| "--message needs an id".to_string())?);
            }
            "--delete-message" => {
                delete_message = Some(args.next().ok_or_else(|| "--delete-message needs an id".to_string())?);
            }
            "--templates" => {
                templates = true;
            }
            "--help" | "-h" => return Ok(CliMode::Help),
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    if let Some(email) = login {
        return Ok(CliMode::Login(email));
    }
    if logout {
        return Ok(CliMode::Logout);
    }
    match send {
        Some(mut message) => {
            message.recipients = recipients;
            message.group_ids = group_ids;
            message.scheduled_at = scheduled_at;
            message.template_id = template_id;
            message.validate().map_err(|e| e.to_string())?;
            return Ok(CliMode::Send(message));
        }
        None => {
            if let Some(flag) = compose_flags.first() {
                return Err(format!("{} only works together with --send", flag));
            }
        }
    }
    if let Some(id) = show_message {
        return Ok(CliMode::ShowMessage(id));
    }
    if let Some(id) = delete_message {
        return Ok(CliMode::DeleteMessage(id));
    }
    if templates {
        return Ok(CliMode::Templates);
    }
    if report {
        return Ok(CliMode::Report);
    }
    if let Some(date) = agenda_date {
        return Ok(CliMode::Agenda { date, sample });
    }
    if upcoming {
        return Ok(CliMode::Upcoming { sample });
    }
    Ok(CliMode::Interactive { sample, month })
}

fn id_list(value: Option<String>, flag: &str) -> Result<Vec<String>, String> {
    let value = value.ok_or_else(|| format!("{} needs a comma separated list", flag))?;
    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect())
}

/// Event list for the printing modes. Load failures fall back to the demo
/// agenda, with the banner text echoed to stderr.
async fn fetch_events(config: &Config, sample: bool, now: DateTime<Utc>) -> anyhow::Result<Vec<EventItem>> {
    if sample {
        return Ok(sample_events(now));
    }
    let (client, _) = loader::open_session(config).context("No se pudo abrir la sesión")?;
    let load = loader::load_events(&client, now).await;
    if let Some(error) = &load.error {
        eprintln!("{}", error);
    }
    Ok(load.events)
}

pub async fn run_agenda_mode(config: &Config, date: NaiveDate, sample: bool) -> anyhow::Result<()> {
    let events = fetch_events(config, sample, Utc::now()).await?;
    let agenda = format_agenda_text(date, &events, &config.ui.date_format);
    display_with_pager(&agenda)?;
    Ok(())
}

pub async fn run_upcoming_mode(config: &Config, sample: bool) -> anyhow::Result<()> {
    let now = Utc::now();
    let events = fetch_events(config, sample, now).await?;
    let text = format_upcoming_text(&upcoming_week(&events, now), &config.ui.date_format);
    display_with_pager(&text)?;
    Ok(())
}

pub async fn run_report_mode(config: &Config) -> anyhow::Result<()> {
    let (client, session) = loader::open_session(config).context("No se pudo abrir la sesión")?;
    let mut ctx = AppContext::new(session.user);
    let year = ctx.year.effective_year(Local::now().date_naive());

    let report = collect_report(&client, &mut ctx, year).await?;
    display_with_pager(&report)?;
    Ok(())
}

async fn collect_report(client: &HttpConsoleClient, ctx: &mut AppContext, year: i32) -> anyhow::Result<String> {
    let fallback = "No se pudo cargar el reporte";
    let (messages, users, schools, usage) = tokio::join!(
        client.list_messages(Some(year)),
        loader::fetch_all_users(client),
        client.list_schools(),
        client.usage_metrics(),
    );

    let messages = messages.map_err(|e| anyhow::anyhow!(e.user_message(fallback)))?;
    ctx.messages.set_messages(messages.items);
    let users = users.map_err(|e| anyhow::anyhow!(e.user_message(fallback)))?;
    let schools = schools.unwrap_or_else(|e| {
        tracing::warn!("School list failed to load: {}", e);
        Vec::new()
    });
    let usage = usage.unwrap_or_else(|e| {
        tracing::warn!("Usage metrics failed to load: {}", e);
        Default::default()
    });

    let breakdown = school_breakdown(&schools, &users, &ctx.messages.messages, &usage.app_active_by_school);
    let mut statuses: BTreeMap<String, usize> = BTreeMap::new();
    for message in &ctx.messages.messages {
        *statuses.entry(status_label(message.status.as_deref())).or_default() += 1;
    }

    Ok(format_report_text(year, &breakdown, &statuses))
}

pub async fn run_send_mode(config: &Config, message: &OutgoingMessage) -> anyhow::Result<()> {
    let (client, session) = loader::open_session(config).context("No se pudo abrir la sesión")?;
    let mut ctx = AppContext::new(session.user);

    let delivered = outbox::deliver(&client, &mut ctx.messages, message)
        .await
        .map_err(|e: OutboxError| anyhow::anyhow!(e.user_message()))?;

    match &message.scheduled_at {
        Some(at) => println!("Mensaje programado para {} ({})", at, delivered.id),
        None => println!("Mensaje enviado ({})", delivered.id),
    }
    Ok(())
}

pub async fn run_message_mode(config: &Config, message_id: &str) -> anyhow::Result<()> {
    let (client, _) = loader::open_session(config).context("No se pudo abrir la sesión")?;
    let message = client
        .get_message(message_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("No se pudo cargar el mensaje")))?;
    display_with_pager(&format_message_text(&message))?;
    Ok(())
}

pub async fn run_delete_message_mode(config: &Config, message_id: &str) -> anyhow::Result<()> {
    let (client, _) = loader::open_session(config).context("No se pudo abrir la sesión")?;
    client
        .delete_message(message_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("No se pudo eliminar el mensaje")))?;
    println!("Mensaje {} eliminado", message_id);
    Ok(())
}

pub async fn run_templates_mode(config: &Config) -> anyhow::Result<()> {
    let (client, _) = loader::open_session(config).context("No se pudo abrir la sesión")?;
    let templates = client
        .list_templates()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("No se pudieron cargar las plantillas")))?;
    display_with_pager(&format_templates_text(&templates))?;
    Ok(())
}

fn status_line(channel: &str, status: Option<&str>) -> String {
    let icon = status.and_then(DeliveryStatus::parse).map_or("•", |s| s.icon());
    format!("{:<8} {} {}", channel, icon, status_label(status))
}

fn format_message_text(message: &Message) -> String {
    let mut lines = vec![format!("Mensaje {}", message.id), String::new()];
    if !message.sender_name.is_empty() {
        lines.push(format!("De: {}", message.sender_name));
    }
    if let Some(created_at) = &message.created_at {
        lines.push(format!("Fecha: {}", created_at));
    }
    lines.push(format!("Destinatarios: {}", message.recipients.len()));
    lines.push(status_line("Estado", message.status.as_deref()));
    lines.push(status_line("Email", message.email_status.as_deref()));
    lines.push(status_line("App", message.app_status.as_deref()));
    lines.push(String::new());
    lines.push(message.content.clone());
    lines.join("\n")
}

fn format_templates_text(templates: &[Template]) -> String {
    let mut lines = vec!["Plantillas".to_string(), String::new()];
    if templates.is_empty() {
        lines.push("No hay plantillas.".to_string());
    }
    for template in templates {
        lines.push(format!("{:<12} {}", template.id, template.name));
        if !template.content.is_empty() {
            lines.push(format!("  {}", truncate_to_width(&template.content, 70)));
        }
    }
    lines.join("\n")
}

fn format_report_text(year: i32, breakdown: &[SchoolSummary], statuses: &BTreeMap<String, usize>) -> String {
    let mut lines = vec![format!("Reporte {}", year), String::new()];

    lines.push(format!(
        "{:<28} {:>8} {:>8} {:>9} {:>10}",
        "Colegio", "Usuarios", "Admins", "Mensajes", "App activa"
    ));
    if breakdown.is_empty() {
        lines.push("Sin datos.".to_string());
    }
    for school in breakdown {
        lines.push(format!(
            "{:<28} {:>8} {:>8} {:>9} {:>10}",
            truncate_to_width(&school.name, 28),
            school.users,
            school.admins,
            school.messages,
            school.app_active
        ));
    }

    lines.push(String::new());
    lines.push("Mensajes por estado".to_string());
    for (label, count) in statuses {
        lines.push(format!("- {:<12} {}", label, count));
    }

    lines.join("\n")
}

fn format_agenda_text(date: NaiveDate, events: &[EventItem], date_format: &str) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Agenda – {}", date.format(date_format)));
    lines.push(String::new());

    let by_day = events_by_day(events.iter());
    match by_day.get(&date) {
        Some(day) if !day.is_empty() => {
            for event in day {
                lines.push(format!("- {}", build_agenda_line(event, usize::MAX)));
            }
        }
        _ => lines.push("No hay eventos programados.".to_string()),
    }

    lines.join("\n")
}

fn format_upcoming_text(events: &[&EventItem], date_format: &str) -> String {
    let mut lines = vec!["Próximos 7 días".to_string(), String::new()];

    if events.is_empty() {
        lines.push("No hay eventos próximos.".to_string());
    }
    for event in events {
        let day = event
            .effective_date()
            .map(|d| d.with_timezone(&Local).format(date_format).to_string())
            .unwrap_or_default();
        lines.push(format!("{:<11} {}", day, build_agenda_line(event, usize::MAX)));
    }

    lines.join("\n")
}

fn build_agenda_line(event: &EventItem, width: usize) -> String {
    let start = event.effective_date().map(|d| d.with_timezone(&Local));
    let end = event.end_date().map(|d| d.with_timezone(&Local));
    let time_label = match (start, end) {
        (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
        (Some(start), None) => start.format("%H:%M").to_string(),
        _ => "--:--".to_string(),
    };

    let line = format!("{:<13} {} [{}]", time_label, event.title, event.event_type.label());
    truncate_to_width(&line, width)
}

fn truncate_to_width(line: &str, width: usize) -> String {
    if width > 0 && line.chars().count() > width {
        let mut truncated = line.chars().take(width.saturating_sub(1)).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        line.to_string()
    }
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            println!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            println!("{text}");
        }
    }

    Ok(())
}
