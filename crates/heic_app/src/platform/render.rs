use heic_core::{AppViewModel, Notice, StatusKind};

/// One line per queue row plus a footer, for terminal output.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.items.len() + 2);
    lines.push(format!("QUEUE ({})", view.item_count));
    for row in &view.items {
        let status = match row.status {
            StatusKind::Pending => "pending".to_string(),
            StatusKind::Converting => "converting".to_string(),
            StatusKind::Completed => match &row.download_name {
                Some(name) => format!("done -> {name}"),
                None => "done".to_string(),
            },
            StatusKind::Error => format!(
                "error: {}",
                row.error.as_deref().unwrap_or("Conversion failed")
            ),
        };
        lines.push(format!("  {:<32} {:>10}  {}", row.name, row.size_label, status));
    }
    if view.archive_offered {
        lines.push(format!("{} images ready", view.completed_count));
    }
    if let Some(notice) = &view.notice {
        lines.push(notice_text(notice));
    }
    lines
}

pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::NoValidFiles => "Please select valid .HEIC files.".to_string(),
        Notice::PackagingFailed(reason) => format!("Failed to create ZIP file: {reason}"),
    }
}
