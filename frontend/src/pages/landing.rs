use chrono::{Datelike, Utc};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, MouseEvent};
use yew::prelude::*;

use crate::components::contact_form::ContactForm;
use crate::config;

struct Service {
    title: &'static str,
    description: &'static str,
}

const SERVICES: [Service; 6] = [
    Service {
        title: "Salesforce Admin & Setup",
        description: "Professional configuration, user management, and security settings tailored to your business processes.",
    },
    Service {
        title: "Flow Automation",
        description: "Build efficient workflows to automate business processes and reduce manual work.",
    },
    Service {
        title: "Apex & LWC Development",
        description: "Custom solutions built with Salesforce's powerful development tools for complex requirements.",
    },
    Service {
        title: "API Integrations",
        description: "Seamlessly connect Salesforce with your other business systems and applications.",
    },
    Service {
        title: "Experience Cloud",
        description: "Build engaging customer and partner portals with personalized experiences.",
    },
    Service {
        title: "Analytics & Dashboards",
        description: "Transform your data into actionable insights with powerful visualizations.",
    },
];

struct Project {
    title: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    results: &'static [(&'static str, &'static str)],
}

const PROJECTS: [Project; 3] = [
    Project {
        title: "Manufacturing Process Automation",
        description: "Automated the entire quote-to-cash process for a mid-sized manufacturer, reducing manual work by 80% and improving deal velocity by 40%.",
        tags: &["Sales Cloud", "Flow", "CPQ"],
        results: &[("80%", "Reduction in manual work"), ("40%", "Faster deal processing")],
    },
    Project {
        title: "Nonprofit Donor Management System",
        description: "Built a custom donor management solution with automated receipting and campaign tracking, helping process 2x more donations.",
        tags: &["Nonprofit Cloud", "LWC", "Apex Triggers"],
        results: &[("2x", "More donations processed"), ("90%", "Faster receipt generation")],
    },
    Project {
        title: "Field Service Mobile App",
        description: "Developed a mobile-optimized solution for field technicians with offline capabilities, reducing service resolution time by 35%.",
        tags: &["Field Service", "Mobile", "LWC"],
        results: &[("35%", "Faster resolution"), ("60%", "Fewer callbacks")],
    },
];

const STATS: [(&str, &str); 4] = [
    ("5+", "Years Experience"),
    ("50+", "Projects Completed"),
    ("100%", "Client Satisfaction"),
    ("24/7", "Support Available"),
];

const CERTIFICATIONS: [&str; 4] = [
    "Salesforce Certified Administrator",
    "Platform App Builder",
    "Flow Automation Specialist",
    "Experience Cloud Consultant",
];

const BOOKING_POINTS: [(&str, &str); 3] = [
    ("Personalized Strategy", "Tailored Salesforce solutions for your business needs"),
    ("Expert Insights", "Leverage years of implementation experience"),
    ("Clear Roadmap", "Walk away with actionable next steps"),
];

const NAV_ITEMS: [(&str, &str); 5] = [
    ("About", "#about"),
    ("Services", "#services"),
    ("Projects", "#projects"),
    ("Book", "#booking"),
    ("Contact", "#contact"),
];

fn map_embed_url(location: &str) -> String {
    format!(
        "https://maps.google.com/maps?q={}&z=15&output=embed",
        urlencoding::encode(location)
    )
}

fn map_link_url(location: &str) -> String {
    format!("https://maps.google.com/?q={}", urlencoding::encode(location))
}

/// `tel:` links take the digits only, keeping a leading `+`.
fn phone_href(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{}", digits)
}

#[function_component(ContactInfo)]
fn contact_info() -> Html {
    let email = config::get_contact_email();
    let phone = config::get_contact_phone();
    let city = config::get_contact_city();
    let methods = [
        ("Email Us", email, format!("mailto:{}", email)),
        ("Call Us", phone, phone_href(phone)),
        ("Location", city, map_link_url(config::get_map_location())),
    ];

    html! {
        <aside class="contact-info">
            <h3>{"Contact Information"}</h3>
            <p>{"Get in touch through any of these channels. I typically respond within 24 hours."}</p>
            { for methods.iter().map(|(title, description, href)| html! {
                <a class="contact-method" href={href.clone()}>
                    <h4>{*title}</h4>
                    <span>{*description}</span>
                </a>
            }) }
            <div class="card working-hours">
                <h4>{"Working Hours"}</h4>
                <p>{"Monday - Friday: 9am - 6pm PST"}</p>
                <p>{"Weekends: Emergency support only"}</p>
            </div>
            <h4>{"Follow Us"}</h4>
            <div class="social-links">
                { for config::get_social_links().iter().map(|(name, href)| html! {
                    <a class="social-link" href={*href} aria-label={*name} target="_blank" rel="noopener noreferrer">{*name}</a>
                }) }
            </div>
        </aside>
    }
}

#[function_component(Header)]
fn header() -> Html {
    let menu_open = use_state(|| false);
    let is_scrolled = use_state(|| false);

    {
        let is_scrolled = is_scrolled.clone();
        use_effect_with_deps(
            move |_| {
                let window = window();
                let scroll_callback = Closure::<dyn Fn()>::new({
                    let window = window.clone();
                    move || {
                        let scroll_y = window
                            .as_ref()
                            .and_then(|w| w.scroll_y().ok())
                            .unwrap_or(0.0);
                        is_scrolled.set(scroll_y > 10.0);
                    }
                });
                if let Some(window) = &window {
                    let _ = window.add_event_listener_with_callback(
                        "scroll",
                        scroll_callback.as_ref().unchecked_ref(),
                    );
                }
                move || {
                    if let Some(window) = &window {
                        let _ = window.remove_event_listener_with_callback(
                            "scroll",
                            scroll_callback.as_ref().unchecked_ref(),
                        );
                    }
                }
            },
            (),
        );
    }

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };
    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(false))
    };

    html! {
        <header class={classes!("top-nav", (*is_scrolled).then(|| "scrolled"))}>
            <div class="nav-content">
                <a href="#" class="nav-logo">
                    <img src="/newLogo512.svg" alt="Diffrenzz Logo" />
                    <span>{"Diffrenzz"}</span>
                </a>
                <button class="burger-menu" onclick={toggle_menu} aria-label="Toggle menu">
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <nav class={classes!("nav-right", (*menu_open).then(|| "mobile-menu-open"))}>
                    { for NAV_ITEMS.iter().map(|(name, href)| html! {
                        <a href={*href} class="nav-link" onclick={close_menu.clone()}>{*name}</a>
                    }) }
                </nav>
            </div>
        </header>
    }
}

#[derive(Properties, PartialEq)]
struct BookingModalProps {
    on_close: Callback<MouseEvent>,
}

#[function_component(BookingModal)]
fn booking_modal(props: &BookingModalProps) -> Html {
    // Clicks inside the dialog must not reach the overlay.
    let stop = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <div class="modal-overlay" onclick={props.on_close.clone()}>
            <div class="modal-dialog" role="dialog" aria-modal="true" onclick={stop}>
                <div class="modal-header">
                    <div>
                        <h3>{"Schedule Your Consultation"}</h3>
                        <p>{"Select a time that works for you"}</p>
                    </div>
                    <button class="modal-close" onclick={props.on_close.clone()} aria-label="Close">{"×"}</button>
                </div>
                <iframe
                    src={config::get_booking_url()}
                    title="Booking Calendar"
                    class="booking-frame"
                    loading="lazy"
                />
            </div>
        </div>
    }
}

#[function_component(Landing)]
pub fn landing() -> Html {
    let booking_open = use_state(|| false);

    let open_booking = {
        let booking_open = booking_open.clone();
        Callback::from(move |_: MouseEvent| booking_open.set(true))
    };
    let close_booking = {
        let booking_open = booking_open.clone();
        Callback::from(move |_: MouseEvent| booking_open.set(false))
    };

    let map_src = map_embed_url(config::get_map_location());

    html! {
        <div class="landing-page">
            <style>
            {r#"* {
                box-sizing: border-box;
            }
            body {
                margin: 0;
                font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
                background: #0b1622;
                color: #fff;
                scroll-behavior: smooth;
            }
            .top-nav {
                position: fixed;
                top: 0;
                width: 100%;
                z-index: 50;
                background: rgba(11, 22, 34, 0.6);
                backdrop-filter: blur(6px);
                transition: background 0.3s ease, box-shadow 0.3s ease;
            }
            .top-nav.scrolled {
                background: rgba(11, 22, 34, 0.92);
                box-shadow: 0 2px 12px rgba(0, 0, 0, 0.3);
            }
            .nav-content {
                max-width: 1200px;
                margin: 0 auto;
                padding: 0.8rem 1.5rem;
                display: flex;
                justify-content: space-between;
                align-items: center;
            }
            .nav-logo {
                display: flex;
                align-items: center;
                gap: 0.6rem;
                color: #fff;
                text-decoration: none;
                font-weight: 700;
                font-size: 1.3rem;
            }
            .nav-logo img {
                height: 40px;
                width: 40px;
            }
            .nav-right {
                display: flex;
                gap: 2rem;
            }
            .nav-link {
                color: rgba(255, 255, 255, 0.85);
                text-decoration: none;
                font-weight: 500;
            }
            .nav-link:hover {
                color: #00A1E0;
            }
            .burger-menu {
                display: none;
                flex-direction: column;
                gap: 5px;
                background: none;
                border: none;
                cursor: pointer;
            }
            .burger-menu span {
                width: 24px;
                height: 2px;
                background: #fff;
            }
            section {
                padding: 6rem 1.5rem;
            }
            .section-inner {
                max-width: 1100px;
                margin: 0 auto;
            }
            .section-title {
                font-size: 2.2rem;
                text-align: center;
                margin-bottom: 3rem;
            }
            .hero {
                min-height: 100vh;
                display: flex;
                flex-direction: column;
                justify-content: center;
                align-items: center;
                text-align: center;
                background: linear-gradient(135deg, #0070D2 0%, #1ea672 55%, #14b8a6 100%);
            }
            .hero h1 {
                font-size: 3.5rem;
                margin: 0 0 1rem;
            }
            .hero h1 .accent {
                color: #fde047;
            }
            .hero p {
                font-size: 1.4rem;
                margin-bottom: 2rem;
                opacity: 0.9;
            }
            .cta-button {
                display: inline-block;
                background: #fff;
                color: #0b1622;
                padding: 0.9rem 2rem;
                border-radius: 999px;
                text-decoration: none;
                font-weight: 600;
                border: none;
                font-size: 1rem;
                cursor: pointer;
            }
            .about-grid {
                display: grid;
                grid-template-columns: 1fr 1fr;
                gap: 3rem;
                align-items: start;
            }
            .stats-grid {
                display: grid;
                grid-template-columns: 1fr 1fr;
                gap: 1rem;
                margin-top: 2rem;
            }
            .stat, .card {
                background: rgba(255, 255, 255, 0.04);
                border: 1px solid rgba(0, 161, 224, 0.15);
                border-radius: 12px;
                padding: 1.5rem;
            }
            .stat-value, .result-value {
                font-size: 1.8rem;
                font-weight: 700;
                color: #00A1E0;
            }
            .certifications li {
                margin-bottom: 0.6rem;
            }
            .card-grid {
                display: grid;
                grid-template-columns: repeat(3, 1fr);
                gap: 1.5rem;
            }
            .card h4 {
                margin-top: 0;
                font-size: 1.2rem;
            }
            .card p {
                color: rgba(255, 255, 255, 0.75);
            }
            .tags {
                display: flex;
                flex-wrap: wrap;
                gap: 0.5rem;
                margin: 1rem 0;
            }
            .tag {
                background: rgba(0, 161, 224, 0.15);
                color: #7fd3f7;
                border-radius: 999px;
                padding: 0.2rem 0.8rem;
                font-size: 0.8rem;
            }
            .results {
                display: flex;
                gap: 1.5rem;
            }
            .booking {
                background: rgba(0, 112, 210, 0.12);
                text-align: center;
            }
            .booking .badge {
                letter-spacing: 0.15em;
                font-size: 0.8rem;
                color: #7fd3f7;
            }
            .booking-points {
                display: grid;
                grid-template-columns: repeat(3, 1fr);
                gap: 1.5rem;
                margin: 2rem 0;
                text-align: left;
            }
            .modal-overlay {
                position: fixed;
                inset: 0;
                background: rgba(0, 0, 0, 0.7);
                display: flex;
                align-items: center;
                justify-content: center;
                z-index: 100;
                padding: 1rem;
            }
            .modal-dialog {
                background: #fff;
                color: #0b1622;
                border-radius: 12px;
                width: 100%;
                max-width: 900px;
                overflow: hidden;
            }
            .modal-header {
                display: flex;
                justify-content: space-between;
                align-items: flex-start;
                padding: 1rem 1.5rem;
            }
            .modal-header h3 {
                margin: 0;
            }
            .modal-close {
                background: none;
                border: none;
                font-size: 1.6rem;
                cursor: pointer;
            }
            .booking-frame {
                width: 100%;
                height: 70vh;
                border: 0;
            }
            .contact-grid {
                display: grid;
                grid-template-columns: 1fr 1fr;
                gap: 3rem;
                align-items: start;
            }
            .contact-method {
                display: block;
                background: rgba(255, 255, 255, 0.04);
                border-radius: 12px;
                padding: 1rem 1.25rem;
                margin-bottom: 1rem;
                color: #fff;
                text-decoration: none;
            }
            .contact-method:hover {
                background: rgba(0, 161, 224, 0.12);
            }
            .contact-method h4 {
                margin: 0 0 0.3rem;
            }
            .contact-method span, .working-hours p {
                color: rgba(255, 255, 255, 0.75);
            }
            .working-hours p {
                margin: 0.3rem 0;
            }
            .social-links {
                display: flex;
                gap: 0.8rem;
            }
            .social-link {
                background: rgba(0, 161, 224, 0.2);
                color: #fff;
                border-radius: 999px;
                padding: 0.4rem 1rem;
                text-decoration: none;
                font-size: 0.9rem;
            }
            .map-frame {
                width: 100%;
                height: 360px;
                border: 0;
                display: block;
            }
            footer {
                text-align: center;
                padding: 2rem;
                color: rgba(255, 255, 255, 0.5);
                font-size: 0.9rem;
            }
            @media (max-width: 768px) {
                .burger-menu {
                    display: flex;
                }
                .nav-right {
                    display: none;
                }
                .nav-right.mobile-menu-open {
                    display: flex;
                    flex-direction: column;
                    position: absolute;
                    top: 64px;
                    left: 0;
                    right: 0;
                    padding: 1.5rem;
                    background: rgba(11, 22, 34, 0.97);
                }
                .hero h1 {
                    font-size: 2.3rem;
                }
                .about-grid, .card-grid, .booking-points, .contact-grid {
                    grid-template-columns: 1fr;
                }
            }"#}
            </style>

            <Header />

            <section class="hero">
                <h1>{"Smart "}<span class="accent">{"Salesforce"}</span>{" Solutions"}</h1>
                <p>{"Tailored development, automation & consulting that drives results"}</p>
                <a href="#contact" class="cta-button">{"Let's Talk"}</a>
            </section>

            <section id="about">
                <div class="section-inner about-grid">
                    <div>
                        <div class="stat">
                            <div class="stat-value">{"5+"}</div>
                            <div>{"Years in Salesforce"}</div>
                        </div>
                        <ul class="certifications">
                            { for CERTIFICATIONS.iter().map(|name| html! { <li>{*name}</li> }) }
                        </ul>
                    </div>
                    <div>
                        <h2>{"About Diffrenzz"}</h2>
                        <p>
                            {"I'm a certified Salesforce consultant dedicated to helping businesses transform their operations through tailored CRM solutions. With a passion for automation and efficiency, I bridge the gap between business needs and technical implementation."}
                        </p>
                        <p>
                            {"My approach combines deep technical expertise with clear communication, ensuring you understand every step of the process while I handle the complex Salesforce configurations behind the scenes."}
                        </p>
                        <div class="stats-grid">
                            { for STATS.iter().map(|(value, label)| html! {
                                <div class="stat">
                                    <div class="stat-value">{*value}</div>
                                    <div>{*label}</div>
                                </div>
                            }) }
                        </div>
                    </div>
                </div>
            </section>

            <section id="services">
                <div class="section-inner">
                    <h2 class="section-title">{"Services"}</h2>
                    <div class="card-grid">
                        { for SERVICES.iter().map(|service| html! {
                            <div class="card">
                                <h4>{service.title}</h4>
                                <p>{service.description}</p>
                            </div>
                        }) }
                    </div>
                </div>
            </section>

            <section id="projects">
                <div class="section-inner">
                    <h2 class="section-title">{"Projects"}</h2>
                    <div class="card-grid">
                        { for PROJECTS.iter().map(|project| html! {
                            <div class="card">
                                <h4>{project.title}</h4>
                                <p>{project.description}</p>
                                <div class="tags">
                                    { for project.tags.iter().map(|tag| html! { <span class="tag">{*tag}</span> }) }
                                </div>
                                <div class="results">
                                    { for project.results.iter().map(|(value, label)| html! {
                                        <div>
                                            <div class="result-value">{*value}</div>
                                            <div>{*label}</div>
                                        </div>
                                    }) }
                                </div>
                            </div>
                        }) }
                    </div>
                </div>
            </section>

            <section id="booking" class="booking">
                <div class="section-inner">
                    <span class="badge">{"FREE CONSULTATION"}</span>
                    <h2>{"Book a call"}</h2>
                    <div class="booking-points">
                        { for BOOKING_POINTS.iter().map(|(title, description)| html! {
                            <div class="card">
                                <h4>{*title}</h4>
                                <p>{*description}</p>
                            </div>
                        }) }
                    </div>
                    <button class="cta-button" onclick={open_booking}>{"Schedule Your Consultation"}</button>
                </div>
            </section>

            <section id="contact" class="contact">
                <div class="section-inner">
                    <h2 class="section-title">{"Contact Me"}</h2>
                    <p>{"Have a project or need advice? Let's talk."}</p>
                    <div class="contact-grid">
                        <ContactForm />
                        <ContactInfo />
                    </div>
                </div>
            </section>

            <iframe src={map_src} title="Location" class="map-frame" loading="lazy" />

            <footer>
                {format!("© {} Diffrenzz. All rights reserved.", Utc::now().year())}
            </footer>

            if *booking_open {
                <BookingModal on_close={close_booking} />
            }
        </div>
    }
}
