#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    match option_env!("BACKEND_URL") {
        Some(url) => url,
        None => "http://localhost:3000", // trunk serve on another port during development
    }
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    option_env!("BACKEND_URL").unwrap_or("") // same origin in production
}

pub fn get_lead_intake_url() -> String {
    match option_env!("LEAD_INTAKE_URL") {
        Some(url) => url.to_string(),
        None => format!("{}/api/leads", get_backend_url()),
    }
}

pub fn get_recaptcha_site_key() -> &'static str {
    option_env!("RECAPTCHA_SITE_KEY").unwrap_or("")
}

pub fn get_booking_url() -> &'static str {
    option_env!("BOOKING_URL").unwrap_or("https://calendar.app.google/HQA1YKCRb9hDWGdp7")
}

pub fn get_map_location() -> &'static str {
    option_env!("MAP_LOCATION").unwrap_or("Diffrenzz Salesforce Consulting")
}

pub fn get_contact_email() -> &'static str {
    option_env!("CONTACT_EMAIL").unwrap_or("hello@diffrenzz.com")
}

pub fn get_contact_phone() -> &'static str {
    option_env!("CONTACT_PHONE").unwrap_or("+1 (555) 123-4567")
}

pub fn get_contact_city() -> &'static str {
    option_env!("CONTACT_CITY").unwrap_or("San Francisco, CA")
}

pub fn get_social_links() -> [(&'static str, &'static str); 3] {
    [
        ("LinkedIn", option_env!("LINKEDIN_URL").unwrap_or("#")),
        ("Twitter", option_env!("TWITTER_URL").unwrap_or("#")),
        ("GitHub", option_env!("GITHUB_URL").unwrap_or("#")),
    ]
}
