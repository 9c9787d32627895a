use crate::api::models::Contact;
use crate::store::ContactBook;
use crate::utils::image_data_url;
use std::path::Path;

/// Lines for the profile card of `contact`.
pub fn profile_lines(contact: Contact, book: &ContactBook) -> Vec<String> {
    let avatar = book.avatar(contact);
    let avatar = if avatar.starts_with("data:") {
        format!("embedded image ({} bytes)", avatar.len())
    } else {
        avatar
    };
    vec![
        format!("About {}", book.name(contact)),
        contact.about().to_string(),
        format!("Avatar: {avatar}"),
    ]
}

/// Existing files are embedded as `data:` URLs; anything else is kept as a link.
pub fn avatar_source(input: &str) -> std::io::Result<String> {
    let input = input.trim();
    let path = Path::new(input);
    if path.is_file() { image_data_url(path) } else { Ok(input.to_string()) }
}
