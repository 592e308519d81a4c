//! Terminal intake form: name and email before the chat unlocks.

use anyhow::Result;
use console::style;
use dialoguer::Input;

use talentchat_core::chat::widget::ChatWidget;
use talentchat_core::inference::InferenceClient;
use talentchat_types::config::Locale;
use talentchat_types::error::{FieldError, IntakeError};

fn labels(locale: Locale) -> (&'static str, &'static str) {
    match locale {
        Locale::Es => ("Nombre", "Correo electrónico"),
        Locale::En => ("Name", "Email"),
    }
}

fn prompt_field(label: &str, current: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(format!("  {label}"))
        .with_initial_text(current.to_string())
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

fn print_field_errors(errors: &[FieldError], locale: Locale) {
    println!();
    for error in errors {
        println!("  {} {}", style("✗").red().bold(), style(error.message(locale)).red());
    }
    println!();
}

/// Fill and submit the intake form until it is accepted.
///
/// Values passed on the command line are tried first; any rejection falls
/// back to prompting, pre-filled with what was entered so far.
pub fn collect_intake<C: InferenceClient + 'static>(
    widget: &mut ChatWidget<C>,
    name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let locale = widget.locale();
    let (name_label, email_label) = labels(locale);

    let mut draft_name = name;
    let mut draft_email = email;

    loop {
        let name = match draft_name.take() {
            Some(name) => name,
            None => prompt_field(name_label, &widget.draft().name)?,
        };
        widget.set_name(name);

        let email = match draft_email.take() {
            Some(email) => email,
            None => prompt_field(email_label, &widget.draft().email)?,
        };
        widget.set_email(email);

        match widget.submit_intake() {
            Ok(_) => return Ok(()),
            Err(IntakeError::Rejected(errors)) => {
                tracing::debug!(errors = errors.len(), "Intake rejected, prompting again");
                print_field_errors(&errors, locale);
            }
            Err(IntakeError::AlreadyUnlocked) => return Ok(()),
        }
    }
}
