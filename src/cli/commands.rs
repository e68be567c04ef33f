use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use crate::{
    cli::config::{AppConfig, build_wizard_options, resolve_endpoint, resolve_trace_path},
    form::{
        definition::{FormDefinition, load_values, read_attachment},
        form_model::{Field, FieldKind, FieldValue, FormModel},
        matricula::recompute,
        validator::{is_step_valid, missing_fields},
    },
    presentation::console::ConsolePresenter,
    trace::logger::TraceLogger,
    transport::http::{HttpTransport, MockTransport, ReqwestTransport},
    wizard::{
        error::WizardError,
        step_controller::AdvanceOutcome,
        submission::SubmitOutcome,
        wizard::RegistrationWizard,
    },
};

/// Resolved global flags shared by every subcommand.
pub struct GlobalArgs<'a> {
    pub config: &'a AppConfig,
    pub endpoint: Option<&'a str>,
    pub trace: Option<&'a str>,
    pub verbose: u8,
}

// ============================================================================
// show-form subcommand
// ============================================================================

pub fn cmd_show_form(form_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let definition = FormDefinition::resolve(form_path)?;
    print!("{}", serde_yaml::to_string(&definition)?);
    Ok(())
}

// ============================================================================
// check subcommand
// ============================================================================

/// Print per-step validity and the derived code. Returns whether everything is ready to submit.
pub fn cmd_check(
    values_path: &str,
    form_path: Option<&str>,
    args: &GlobalArgs,
) -> Result<bool, Box<dyn std::error::Error>> {
    let definition = FormDefinition::resolve(form_path)?;
    let mut form = definition.to_model()?;
    for (name, value) in load_values(values_path, &form)? {
        form.set_value(&name, value)?;
    }

    print!("{}", format_check_report(&form, args.config));
    let code = recompute(
        form.text(&args.config.matricula.surname_field),
        form.text(&args.config.matricula.id_field),
    );
    Ok(form.steps().iter().all(is_step_valid) && code.is_some())
}

/// Format a step-by-step validity report.
///
/// ```text
/// ✓ Step 1: Datos personales
/// ✗ Step 2: Datos académicos (missing: turno, modulos)
/// Registration code: G-4321
/// ```
pub fn format_check_report(form: &FormModel, config: &AppConfig) -> String {
    let mut out = String::new();

    for step in form.steps() {
        let missing = missing_fields(step);
        if missing.is_empty() {
            out.push_str(&format!("\u{2713} Step {}: {}\n", step.index + 1, step.title));
        } else {
            out.push_str(&format!(
                "\u{2717} Step {}: {} (missing: {})\n",
                step.index + 1,
                step.title,
                missing.join(", ")
            ));
        }
    }

    match recompute(
        form.text(&config.matricula.surname_field),
        form.text(&config.matricula.id_field),
    ) {
        Some(code) => out.push_str(&format!("Registration code: {}\n", code)),
        None => out.push_str("Registration code: (not available)\n"),
    }
    out
}

// ============================================================================
// submit subcommand
// ============================================================================

/// Fill every step from a values file, advance to the end and submit once.
pub fn cmd_submit(
    values_path: &str,
    form_path: Option<&str>,
    dry_run: bool,
    args: &GlobalArgs,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut wizard = build_wizard(form_path, dry_run, args)?;
    let values = load_values(values_path, wizard.form())?;

    for (name, value) in values {
        wizard.set_value(&name, value)?;
    }

    loop {
        match wizard.advance() {
            Ok(AdvanceOutcome::Advanced(step)) => {
                if args.verbose > 0 {
                    eprintln!("Advanced to step {}", step + 1);
                }
            }
            Ok(AdvanceOutcome::AtLastStep) => break,
            Err(e) => {
                eprintln!("Cannot continue: {}", e);
                return Ok(false);
            }
        }
    }

    match wizard.submit() {
        Ok(SubmitOutcome::Succeeded) => Ok(true),
        Ok(_) => Ok(false),
        Err(e) => {
            eprintln!("Submission blocked: {}", e);
            Ok(false)
        }
    }
}

// ============================================================================
// run subcommand
// ============================================================================

pub fn cmd_run(
    form_path: Option<&str>,
    dry_run: bool,
    args: &GlobalArgs,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut wizard = build_wizard(form_path, dry_run, args)?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    run_interactive(&mut wizard, &mut input)
}

/// Prompt for each field of the active step, advance, and submit on the
/// last step. Returns whether the submission succeeded; EOF aborts with `false`.
pub fn run_interactive<T: HttpTransport, R: BufRead>(
    wizard: &mut RegistrationWizard<ConsolePresenter, T>,
    input: &mut R,
) -> Result<bool, Box<dyn std::error::Error>> {
    loop {
        let step_index = wizard.current_step();
        let fields: Vec<Field> = wizard
            .form()
            .step(step_index)
            .map(|s| s.fields.clone())
            .unwrap_or_default();

        for field in &fields {
            if !prompt_field(wizard, field, input)? {
                return Ok(false);
            }
        }

        match wizard.advance() {
            Ok(AdvanceOutcome::Advanced(_)) => continue,
            Ok(AdvanceOutcome::AtLastStep) => {}
            // the warning was already shown; ask for the step again
            Err(WizardError::Validation { .. }) => continue,
            Err(e) => return Err(e.into()),
        }

        loop {
            match wizard.submit() {
                Ok(SubmitOutcome::Succeeded) => return Ok(true),
                Ok(SubmitOutcome::Ignored) => return Ok(false),
                Ok(SubmitOutcome::Failed(_)) => {
                    match read_answer("Retry submission? [y/N] ", input)? {
                        Some(a) if a.trim().eq_ignore_ascii_case("y") => continue,
                        _ => return Ok(false),
                    }
                }
                Err(WizardError::Generation) => {
                    if !prompt_code_sources(wizard, input)? {
                        return Ok(false);
                    }
                }
                // last step incomplete: fill it again
                Err(WizardError::Validation { .. }) => break,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Re-ask the surname and id fields, wherever they live, until a code
/// can be generated. `false` on EOF.
fn prompt_code_sources<T: HttpTransport, R: BufRead>(
    wizard: &mut RegistrationWizard<ConsolePresenter, T>,
    input: &mut R,
) -> Result<bool, Box<dyn std::error::Error>> {
    let (surname, id) = wizard.code_source_fields();
    let fields: Vec<Field> = [surname, id]
        .iter()
        .filter_map(|name| wizard.form().field(name).cloned())
        .collect();

    loop {
        for field in &fields {
            if !prompt_field(wizard, field, input)? {
                return Ok(false);
            }
        }
        match wizard.generate_code() {
            Ok(_) => return Ok(true),
            Err(WizardError::Generation) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Ask until the field accepts a value. `false` on EOF.
fn prompt_field<T: HttpTransport, R: BufRead>(
    wizard: &mut RegistrationWizard<ConsolePresenter, T>,
    field: &Field,
    input: &mut R,
) -> Result<bool, Box<dyn std::error::Error>> {
    loop {
        let prompt = field_prompt(field);
        let Some(answer) = read_answer(&prompt, input)? else {
            return Ok(false);
        };

        let value = match parse_answer(field, &answer, Path::new(".")) {
            Ok(v) => v,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match wizard.set_value(&field.name, value) {
            Ok(()) => return Ok(true),
            Err(e @ WizardError::UnknownOption { .. }) => println!("{}", e),
            Err(e) => return Err(e.into()),
        }
    }
}

fn field_prompt(field: &Field) -> String {
    let marker = if field.required { "*" } else { "" };
    let mut prompt = format!("{}{}", field.label, marker);

    if !field.options.is_empty() {
        let options: Vec<String> = field
            .options
            .iter()
            .enumerate()
            .map(|(i, o)| format!("{}) {}", i + 1, o))
            .collect();
        prompt.push_str(&format!(" [{}]", options.join(", ")));
    }
    match field.kind {
        FieldKind::MultiSelect => prompt.push_str(" (comma separated)"),
        FieldKind::File => prompt.push_str(" (file paths, comma separated)"),
        _ => {}
    }
    prompt.push_str(": ");
    prompt
}

fn read_answer<R: BufRead>(prompt: &str, input: &mut R) -> Result<Option<String>, std::io::Error> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Turn a typed answer into a value for `field`.
///
/// Select answers may be the option text or its 1-based number; file
/// answers are paths relative to `base`.
pub fn parse_answer(field: &Field, answer: &str, base: &Path) -> Result<FieldValue, WizardError> {
    let pick = |token: &str| -> String {
        token
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| field.options.get(i).cloned())
            .unwrap_or_else(|| token.to_string())
    };
    let tokens = || {
        answer
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    };

    match field.kind {
        FieldKind::Text => Ok(FieldValue::Text(answer.to_string())),
        FieldKind::Select => {
            let token = answer.trim();
            if token.is_empty() {
                Ok(FieldValue::Text(String::new()))
            } else {
                Ok(FieldValue::Text(pick(token)))
            }
        }
        FieldKind::MultiSelect => Ok(FieldValue::selected(tokens().map(pick))),
        FieldKind::File => {
            let files = tokens()
                .map(|p| read_attachment(&base.join(p)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FieldValue::Files(files))
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn build_transport(
    dry_run: bool,
    config: &AppConfig,
) -> Result<Box<dyn HttpTransport>, Box<dyn std::error::Error>> {
    if dry_run {
        return Ok(Box::new(MockTransport::new()));
    }
    let timeout = config.submit.timeout_secs.map(Duration::from_secs);
    Ok(Box::new(ReqwestTransport::new(timeout)?))
}

fn build_wizard(
    form_path: Option<&str>,
    dry_run: bool,
    args: &GlobalArgs,
) -> Result<RegistrationWizard<ConsolePresenter, Box<dyn HttpTransport>>, Box<dyn std::error::Error>>
{
    let endpoint = match resolve_endpoint(args.endpoint, args.config) {
        Some(e) => e,
        None if dry_run => "dry-run://local".to_string(),
        None => return Err("no submission endpoint configured (use --endpoint or submit.endpoint)".into()),
    };

    let form = FormDefinition::resolve(form_path)?.to_model()?;
    let transport = build_transport(dry_run, args.config)?;
    let tracer = TraceLogger::new(&resolve_trace_path(args.trace, args.config));

    if args.verbose > 0 {
        eprintln!("Submitting to {}", endpoint);
    }

    Ok(RegistrationWizard::new(
        form,
        build_wizard_options(args.config, &endpoint),
        ConsolePresenter::new(args.verbose),
        transport,
        tracer,
    ))
}
