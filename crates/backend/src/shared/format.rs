/// Первые `max_chars` символов строки (по символам, не байтам)
///
/// # Примеры
/// ```ignore
/// assert_eq!(truncate_chars("привет", 3), "при");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Превью для логов: обрезанный текст с "..." если что-то отброшено
pub fn preview(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Размер тела ответа в человекочитаемом виде
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}
