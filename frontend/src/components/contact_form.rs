use std::rc::Rc;

use diffrenzz_leads::{
    Field, LeadWorkflow, Notice, Subject, VerificationToken, WorkflowConfig, WorkflowSnapshot,
    WorkflowState,
};
use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::recaptcha::Recaptcha;
use crate::config;
use crate::intake::HttpIntake;
use crate::timer::GlooTimer;

type FormWorkflow = LeadWorkflow<HttpIntake, GlooTimer>;

fn user_agent() -> Option<String> {
    window().and_then(|w| w.navigator().user_agent().ok())
}

fn field_error(snapshot: &WorkflowSnapshot, field: Field) -> Html {
    match snapshot.errors.get(field) {
        Some(error) => html! { <span class="field-error">{error.message(field)}</span> },
        None => html! {},
    }
}

fn input_class(snapshot: &WorkflowSnapshot, field: Field) -> Classes {
    classes!("form-input", snapshot.errors.get(field).map(|_| "invalid"))
}

#[function_component(ContactForm)]
pub fn contact_form() -> Html {
    let workflow = use_state(|| {
        Rc::new(FormWorkflow::new(
            HttpIntake::new(config::get_lead_intake_url()),
            GlooTimer,
            WorkflowConfig {
                user_agent: user_agent(),
                ..WorkflowConfig::default()
            },
        ))
    });
    let snapshot = use_state(|| workflow.snapshot());

    {
        let workflow = workflow.clone();
        let snapshot = snapshot.clone();
        use_effect_with_deps(
            move |_| {
                let id = workflow.subscribe(move |next: &WorkflowSnapshot| snapshot.set(next.clone()));
                move || workflow.unsubscribe(id)
            },
            (),
        );
    }

    let on_text = |field: Field| {
        let workflow = workflow.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            workflow.set_field(field, input.value());
        })
    };

    let on_message = {
        let workflow = workflow.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            workflow.set_field(Field::Message, input.value());
        })
    };

    let on_subject = {
        let workflow = workflow.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            workflow.set_field(Field::Subject, select.value());
        })
    };

    let on_consent = {
        let workflow = workflow.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            workflow.set_consent(input.checked());
        })
    };

    let on_token = {
        let workflow = workflow.clone();
        Callback::from(move |token: String| workflow.set_token(VerificationToken::new(token)))
    };

    let on_expired = {
        let workflow = workflow.clone();
        Callback::from(move |_: ()| workflow.expire_token())
    };

    let on_dismiss = {
        let workflow = workflow.clone();
        Callback::from(move |_: MouseEvent| workflow.dismiss_alert())
    };

    let onsubmit = {
        let workflow = workflow.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let workflow = Rc::clone(&*workflow);
            spawn_local(async move {
                match workflow.submit().await {
                    Ok(()) => {
                        info!("Contact form sent");
                        workflow.hold_confirmation().await;
                    }
                    Err(e) => warn!("Contact form not sent: {}", e),
                }
            });
        })
    };

    let submitting = snapshot.state == WorkflowState::Submitting;
    let fields = &snapshot.fields;

    html! {
        <form class="contact-form" onsubmit={onsubmit} novalidate={true}>
            <style>
            {r#".contact-form {
                display: flex;
                flex-direction: column;
                gap: 1.2rem;
                width: 100%;
                max-width: 640px;
            }
            .contact-form .form-row {
                display: grid;
                grid-template-columns: 1fr 1fr;
                gap: 1rem;
            }
            .contact-form label {
                display: flex;
                flex-direction: column;
                gap: 0.4rem;
                color: rgba(255, 255, 255, 0.85);
                font-size: 0.95rem;
            }
            .form-input {
                background: rgba(255, 255, 255, 0.05);
                border: 1px solid rgba(0, 161, 224, 0.25);
                border-radius: 8px;
                padding: 0.8rem 1rem;
                color: #fff;
                font-size: 1rem;
            }
            .form-input.invalid {
                border-color: #ff6b6b;
            }
            .field-error {
                color: #ff6b6b;
                font-size: 0.85rem;
            }
            .consent-row {
                flex-direction: row !important;
                align-items: flex-start;
            }
            .form-notice, .form-alert, .form-success {
                border-radius: 8px;
                padding: 0.9rem 1rem;
                font-size: 0.95rem;
            }
            .form-notice {
                background: rgba(255, 193, 7, 0.12);
                border: 1px solid rgba(255, 193, 7, 0.4);
            }
            .form-alert {
                display: flex;
                justify-content: space-between;
                align-items: center;
                background: rgba(255, 107, 107, 0.12);
                border: 1px solid rgba(255, 107, 107, 0.4);
            }
            .form-alert button {
                background: none;
                border: none;
                color: inherit;
                font-size: 1.2rem;
                cursor: pointer;
            }
            .form-success {
                background: rgba(76, 175, 80, 0.12);
                border: 1px solid rgba(76, 175, 80, 0.4);
            }
            .submit-button {
                background: linear-gradient(45deg, #00A1E0, #0070D2);
                color: white;
                border: none;
                padding: 1rem 2rem;
                border-radius: 8px;
                font-size: 1.1rem;
                cursor: pointer;
                transition: opacity 0.3s ease;
            }
            .submit-button:disabled {
                opacity: 0.6;
                cursor: not-allowed;
            }
            @media (max-width: 768px) {
                .contact-form .form-row {
                    grid-template-columns: 1fr;
                }
            }"#}
            </style>

            if snapshot.state == WorkflowState::Succeeded {
                <div class="form-success" role="status">
                    {"Thank you! Your message is on its way. We'll get back to you within one business day."}
                </div>
            }

            <div class="form-row">
                <label>
                    {"First name *"}
                    <input
                        type="text"
                        class={input_class(&snapshot, Field::FirstName)}
                        value={fields.first_name.clone()}
                        oninput={on_text(Field::FirstName)}
                        autocomplete="given-name"
                    />
                    {field_error(&snapshot, Field::FirstName)}
                </label>
                <label>
                    {"Last name *"}
                    <input
                        type="text"
                        class={input_class(&snapshot, Field::LastName)}
                        value={fields.last_name.clone()}
                        oninput={on_text(Field::LastName)}
                        autocomplete="family-name"
                    />
                    {field_error(&snapshot, Field::LastName)}
                </label>
            </div>

            <div class="form-row">
                <label>
                    {"Company"}
                    <input
                        type="text"
                        class="form-input"
                        value={fields.company.clone()}
                        oninput={on_text(Field::Company)}
                        autocomplete="organization"
                    />
                </label>
                <label>
                    {"Email *"}
                    <input
                        type="email"
                        class={input_class(&snapshot, Field::Email)}
                        value={fields.email.clone()}
                        oninput={on_text(Field::Email)}
                        autocomplete="email"
                    />
                    {field_error(&snapshot, Field::Email)}
                </label>
            </div>

            <label>
                {"Subject *"}
                <select class={input_class(&snapshot, Field::Subject)} onchange={on_subject}>
                    <option value="" selected={fields.subject.is_empty()}>{"Select a subject"}</option>
                    { for Subject::ALL.iter().map(|subject| html! {
                        <option
                            value={subject.as_str()}
                            selected={fields.subject == subject.as_str()}
                        >
                            {subject.label()}
                        </option>
                    }) }
                </select>
                {field_error(&snapshot, Field::Subject)}
            </label>

            <label>
                {"Message *"}
                <textarea
                    rows="6"
                    class={input_class(&snapshot, Field::Message)}
                    value={fields.message.clone()}
                    oninput={on_message}
                    placeholder="Tell us about your Salesforce project"
                />
                {field_error(&snapshot, Field::Message)}
            </label>

            <label class="consent-row">
                <input
                    type="checkbox"
                    checked={fields.consent_given}
                    onchange={on_consent}
                />
                <span>
                    {"I agree that Diffrenzz may store and process my data to answer this request. *"}
                </span>
            </label>
            {field_error(&snapshot, Field::Consent)}

            <Recaptcha
                site_key={config::get_recaptcha_site_key().to_string()}
                has_token={snapshot.has_token}
                on_token={on_token}
                on_expired={on_expired}
            />

            {
                match &snapshot.notice {
                    Some(Notice::ChallengeRequired) => html! {
                        <div class="form-notice" role="alert">
                            {"Please complete the reCAPTCHA verification before sending."}
                        </div>
                    },
                    Some(Notice::Alert(message)) => html! {
                        <div class="form-alert" role="alert">
                            <span>{message.clone()}</span>
                            <button type="button" onclick={on_dismiss} aria-label="Dismiss">{"×"}</button>
                        </div>
                    },
                    None => html! {},
                }
            }

            <button type="submit" class="submit-button" disabled={submitting}>
                { if submitting { "Sending..." } else { "Send message" } }
            </button>
        </form>
    }
}
