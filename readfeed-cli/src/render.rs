use readfeed_core::{extract_paragraphs, ArticleView};

const PREVIEW_LINES: usize = 4;

pub fn print_loading(username: &str) {
    println!("Loading stories by @{username}...");
}

pub fn print_error(message: &str) {
    eprintln!("Unable to read the article cache: {message}");
}

pub fn print_articles(views: &[ArticleView], width: usize) {
    println!();
    if views.is_empty() {
        println!("(no articles yet)");
        return;
    }
    println!("{} article(s)", views.len());
    for view in views {
        println!("{}", "-".repeat(width.min(80)));
        println!("{}", view.title);
        println!("{}", view.display_date);
        if let Some(image) = &view.image_url {
            println!("[image] {image}");
        }
        for line in preview(&view.content, width).lines().take(PREVIEW_LINES) {
            println!("  {line}");
        }
    }
}

/// Plain-text rendering of the article paragraphs.
fn preview(content: &str, width: usize) -> String {
    let html = format!("<p>{}</p>", extract_paragraphs(content));
    html2text::from_read(html.as_bytes(), width.max(20))
}
