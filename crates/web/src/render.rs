//! HTML pages.
//!
//! Every page shares one layout. Text that comes from the database goes
//! through [`escape`] before it is interpolated.

use axum::response::Html;

use db::models::{LettingDetail, LettingRow, ProfileDetail, ProfileListing};

/// Escape text for use inside HTML content or attribute values.
pub fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="/static/css/styles.css">
</head>
<body>
  <nav>
    <a href="/">Home</a>
    <a href="/profiles/">Profiles</a>
    <a href="/lettings/">Lettings</a>
  </nav>
  <main>
{body}
  </main>
</body>
</html>
"#,
        title = escape(title),
    ))
}

pub fn home() -> Html<String> {
    layout(
        "Holiday Homes",
        r#"    <h1>Welcome to Holiday Homes</h1>
    <p><a href="/profiles/">Profiles</a> | <a href="/lettings/">Lettings</a></p>"#,
    )
}

pub fn lettings_index(lettings: &[LettingRow]) -> Html<String> {
    let mut body = String::from("    <h1>Lettings</h1>\n");

    if lettings.is_empty() {
        body.push_str("    <p>No lettings are available.</p>");
    } else {
        body.push_str("    <ul>\n");
        for letting in lettings {
            body.push_str(&format!(
                "      <li><a href=\"/lettings/{}/\">{}</a></li>\n",
                letting.id,
                escape(&letting.title)
            ));
        }
        body.push_str("    </ul>");
    }

    layout("Lettings", &body)
}

pub fn letting(detail: &LettingDetail) -> Html<String> {
    let address = &detail.address;
    let body = format!(
        r#"    <h1>{title}</h1>
    <address>
      <p>{address_line}</p>
      <p>{city}, {state} {zip_code}</p>
      <p>{country}</p>
    </address>
    <p><a href="/lettings/">Back</a></p>"#,
        title = escape(&detail.letting.title),
        address_line = escape(&address.to_string()),
        city = escape(&address.city),
        state = escape(&address.state),
        zip_code = address.zip_code,
        country = escape(&address.country_iso_code),
    );

    layout(&detail.letting.title, &body)
}

pub fn profiles_index(profiles: &[ProfileListing]) -> Html<String> {
    let mut body = String::from("    <h1>Profiles</h1>\n");

    if profiles.is_empty() {
        body.push_str("    <p>No profiles are available.</p>");
    } else {
        body.push_str("    <ul>\n");
        for profile in profiles {
            let username = escape(&profile.username);
            body.push_str(&format!(
                "      <li><a href=\"/profiles/{username}/\">{username}</a></li>\n"
            ));
        }
        body.push_str("    </ul>");
    }

    layout("Profiles", &body)
}

pub fn profile(detail: &ProfileDetail) -> Html<String> {
    let user = &detail.user;
    let body = format!(
        r#"    <h1>{username}</h1>
    <p>First name: {first_name}</p>
    <p>Last name: {last_name}</p>
    <p>Email: {email}</p>
    <p>Favorite city: {favorite_city}</p>
    <p><a href="/profiles/">Back</a></p>"#,
        username = escape(&detail.to_string()),
        first_name = escape(&user.first_name),
        last_name = escape(&user.last_name),
        email = escape(&user.email),
        favorite_city = escape(&detail.profile.favorite_city),
    );

    layout(&user.username, &body)
}

pub fn not_found() -> Html<String> {
    layout(
        "Page not found",
        "    <h1>404</h1>\n    <p>The page you are looking for does not exist.</p>",
    )
}

pub fn server_error() -> Html<String> {
    layout(
        "Server error",
        "    <h1>500</h1>\n    <p>Something went wrong on our side. Please try again later.</p>",
    )
}
