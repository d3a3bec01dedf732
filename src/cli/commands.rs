//! Command dispatch for the shell. Commands arrive pre-tokenized (argv or
//! shell-words split script lines).

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::cli::formatters;
use crate::cli::shell_context::ShellContext;
use crate::core::errors::CliError;
use crate::core::services::{
    AllocationService, NewReceipt, PayByParentRequest, PayForwardRequest, PeriodService,
    ReceiptService, ReceivableFilter, ReceivableService,
};
use crate::core::time::{Clock, FixedClock, SystemClock};
use crate::domain::{BillingMonth, PaymentStatus, Student};
use crate::ledger::Ledger;
use crate::storage::StorageBackend;

pub fn execute(ctx: &mut ShellContext, args: &[String]) -> Result<(), CliError> {
    let (positional, options) = split_options(args)?;
    let command = positional.first().map(String::as_str).unwrap_or("help");
    let subcommand = positional.get(1).map(String::as_str).unwrap_or("");
    match (command, subcommand) {
        ("help", _) => print_help(),
        ("student", "add") => student_add(ctx, &positional, &options),
        ("student", "list") => {
            formatters::print_students(&ctx.roster.students);
            Ok(())
        }
        ("period", "create") => period_create(ctx, &positional),
        ("period", "bulk") => period_bulk(ctx, &positional),
        ("period", "due-date") => period_due_date(ctx, &positional),
        ("receipt", "record") => receipt_record(ctx, &positional, &options),
        ("pay", "forward") => pay_forward(ctx, &positional, &options),
        ("pay", "parent") => pay_parent(ctx, &positional, &options),
        ("receivable", "summary") => receivable_summary(ctx, &positional, &options),
        ("receivable", "list") => receivable_list(ctx, &options),
        ("receivable", "student") => receivable_student(ctx, &positional, &options),
        ("receivable", "dashboard") => receivable_dashboard(ctx, &options),
        ("ledger", "new") => ledger_new(ctx, &positional),
        ("ledger", "load") => ledger_load(ctx, &positional),
        ("ledger", "save") => {
            ctx.persist()?;
            println!("ledger `{}` saved", ctx.ledger.name);
            Ok(())
        }
        ("ledger", "list") => {
            for name in ctx.storage.list_ledgers()? {
                println!("{name}");
            }
            Ok(())
        }
        ("ledger", "backup") => {
            ctx.storage.backup_ledger(
                &ctx.ledger,
                &ctx.ledger.name,
                options.get("note").map(String::as_str),
            )?;
            println!("backup created for `{}`", ctx.ledger.name);
            Ok(())
        }
        _ => Err(CliError::Input(format!(
            "unknown command `{}`; try `help`",
            args.join(" ")
        ))),
    }
}

fn print_help() -> Result<(), CliError> {
    println!("tuition_core_cli commands:");
    println!("  student add <name> [--fee F] [--parent ID] [--sibling-of NAME] [--teacher ID]");
    println!("  student list");
    println!("  period create <student> <month> <year>");
    println!("  period bulk <month> <year>");
    println!("  period due-date <student> <month> <year> <YYYY-MM-DD|none>");
    println!("  receipt record <student> <month> <year> <amount> <date> [--number N] [--notes T]");
    println!("  pay forward <student> <from-m> <from-y> <to-m> <to-y> <amount> <date>");
    println!("  pay parent <student|parent-id> <month> <year> <amount> <discount> <date>");
    println!("  receivable summary <student> <month> <year> [--today D]");
    println!("  receivable list [--student S] [--month M] [--year Y] [--status unpaid|partial]");
    println!("                  [--search T] [--page N] [--per-page N] [--today D]");
    println!("  receivable student <student> [--today D]");
    println!("  receivable dashboard [--today D]");
    println!("  ledger new|load|save|list|backup ...");
    println!("  run with --script <file> to execute one command per line");
    Ok(())
}

fn student_add(
    ctx: &mut ShellContext,
    positional: &[String],
    options: &HashMap<String, String>,
) -> Result<(), CliError> {
    let name = positional
        .get(2)
        .ok_or_else(|| CliError::Input("usage: student add <name>".into()))?;
    let mut student = Student::new(name.clone());
    if let Some(fee) = options.get("fee") {
        student = student.with_fee(parse_amount(fee)?);
    }
    if let Some(parent) = options.get("parent") {
        student = student.with_parent(parse_uuid(parent)?);
    }
    if let Some(teacher) = options.get("teacher") {
        student = student.with_teacher(parse_uuid(teacher)?);
    }
    if let Some(sibling) = options.get("sibling-of") {
        let sibling = ctx.resolve_student(sibling)?;
        let parent_id = match sibling.parent_id {
            Some(id) => id,
            None => {
                // First sibling link creates the shared parent id.
                let id = Uuid::new_v4();
                if let Some(existing) = ctx.roster.student_mut(sibling.id) {
                    existing.parent_id = Some(id);
                }
                id
            }
        };
        student.parent_id = Some(parent_id);
    }
    let id = ctx.roster.add(student);
    println!("added student {id}");
    Ok(())
}

fn period_create(ctx: &mut ShellContext, positional: &[String]) -> Result<(), CliError> {
    let [student, month, year] = expect_positional::<3>(positional, "period create <student> <month> <year>")?;
    let student = ctx.resolve_student(&student)?;
    let month = parse_month(&month, &year)?;
    let id = PeriodService::create_single(
        &mut ctx.ledger,
        &ctx.roster,
        &ctx.actor,
        student.id,
        month,
    )?;
    println!("created period {id} for {} in {month}", student.name);
    Ok(())
}

fn period_bulk(ctx: &mut ShellContext, positional: &[String]) -> Result<(), CliError> {
    let [month, year] = expect_positional::<2>(positional, "period bulk <month> <year>")?;
    let month = parse_month(&month, &year)?;
    let outcome = PeriodService::create_bulk(&mut ctx.ledger, &ctx.roster, &ctx.actor, month)?;
    println!(
        "bulk creation for {month}: created {} skipped {}",
        outcome.created, outcome.skipped
    );
    Ok(())
}

fn period_due_date(ctx: &mut ShellContext, positional: &[String]) -> Result<(), CliError> {
    let [student, month, year, date] =
        expect_positional::<4>(positional, "period due-date <student> <month> <year> <date|none>")?;
    let student = ctx.resolve_student(&student)?;
    let month = parse_month(&month, &year)?;
    let period = ctx.resolve_period(student.id, month)?;
    let date = if date.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(parse_date(&date)?)
    };
    PeriodService::set_due_date(&mut ctx.ledger, &ctx.actor, period, date)?;
    println!("due date updated for {} in {month}", student.name);
    Ok(())
}

fn receipt_record(
    ctx: &mut ShellContext,
    positional: &[String],
    options: &HashMap<String, String>,
) -> Result<(), CliError> {
    let [student, month, year, amount, date] = expect_positional::<5>(
        positional,
        "receipt record <student> <month> <year> <amount> <date>",
    )?;
    let student = ctx.resolve_student(&student)?;
    let month = parse_month(&month, &year)?;
    let period = ctx.resolve_period(student.id, month)?;
    let mut input = NewReceipt::new(parse_amount(&amount)?, parse_date(&date)?);
    input.receipt_number = options.get("number").cloned();
    input.notes = options.get("notes").cloned();
    let id = ReceiptService::record(&mut ctx.ledger, &ctx.actor, period, input)?;
    println!("recorded receipt {id} for {} in {month}", student.name);
    Ok(())
}

fn pay_forward(
    ctx: &mut ShellContext,
    positional: &[String],
    options: &HashMap<String, String>,
) -> Result<(), CliError> {
    let [student, from_month, from_year, to_month, to_year, amount, date] = expect_positional::<7>(
        positional,
        "pay forward <student> <from-m> <from-y> <to-m> <to-y> <amount> <date>",
    )?;
    let student = ctx.resolve_student(&student)?;
    let request = PayForwardRequest {
        student_id: student.id,
        from: parse_month(&from_month, &from_year)?,
        to: parse_month(&to_month, &to_year)?,
        total_amount: parse_amount(&amount)?,
        date: parse_date(&date)?,
        receipt_number: options.get("number").cloned(),
        notes: options.get("notes").cloned(),
    };
    let outcome =
        AllocationService::pay_forward(&mut ctx.ledger, &ctx.roster, &ctx.actor, request)?;
    formatters::print_pay_forward(&outcome);
    Ok(())
}

fn pay_parent(
    ctx: &mut ShellContext,
    positional: &[String],
    options: &HashMap<String, String>,
) -> Result<(), CliError> {
    let [target, month, year, amount, discount, date] = expect_positional::<6>(
        positional,
        "pay parent <student|parent-id> <month> <year> <amount> <discount> <date>",
    )?;
    let parent_id = if let Ok(id) = Uuid::parse_str(&target) {
        id
    } else {
        ctx.resolve_student(&target)?
            .parent_id
            .ok_or_else(|| CliError::Input(format!("student `{target}` has no linked parent")))?
    };
    let request = PayByParentRequest {
        parent_id,
        month: parse_month(&month, &year)?,
        total_amount: parse_amount(&amount)?,
        discount: parse_amount(&discount)?,
        date: parse_date(&date)?,
        receipt_number: options.get("number").cloned(),
        notes: options.get("notes").cloned(),
    };
    let outcome =
        AllocationService::pay_by_parent(&mut ctx.ledger, &ctx.roster, &ctx.actor, request)?;
    formatters::print_pay_by_parent(&outcome);
    Ok(())
}

fn receivable_summary(
    ctx: &mut ShellContext,
    positional: &[String],
    options: &HashMap<String, String>,
) -> Result<(), CliError> {
    let [student, month, year] =
        expect_positional::<3>(positional, "receivable summary <student> <month> <year>")?;
    let student = ctx.resolve_student(&student)?;
    let month = parse_month(&month, &year)?;
    let period = ctx.resolve_period(student.id, month)?;
    let clock = clock_from(options)?;
    let summary = ReceivableService::summary(&ctx.ledger, clock.as_ref(), period)?;
    formatters::print_summary(&student.name, &summary);
    Ok(())
}

fn receivable_list(
    ctx: &mut ShellContext,
    options: &HashMap<String, String>,
) -> Result<(), CliError> {
    let mut filter = ReceivableFilter::default();
    if let Some(student) = options.get("student") {
        filter.student_id = Some(ctx.resolve_student(student)?.id);
    }
    if let Some(month) = options.get("month") {
        filter.month = Some(parse_number(month, "month")?);
    }
    if let Some(year) = options.get("year") {
        filter.year = Some(parse_number(year, "year")?);
    }
    if let Some(status) = options.get("status") {
        filter.status = Some(parse_status(status)?);
    }
    filter.search = options.get("search").cloned();
    if let Some(page) = options.get("page") {
        filter.page = parse_number(page, "page")?;
    }
    if let Some(per_page) = options.get("per-page") {
        filter.per_page = parse_number(per_page, "per-page")?;
    }
    let clock = clock_from(options)?;
    let page = ReceivableService::list(&ctx.ledger, &ctx.roster, clock.as_ref(), &filter)?;
    formatters::print_receivable_page(&page);
    Ok(())
}

fn receivable_student(
    ctx: &mut ShellContext,
    positional: &[String],
    options: &HashMap<String, String>,
) -> Result<(), CliError> {
    let [student] = expect_positional::<1>(positional, "receivable student <student>")?;
    let student = ctx.resolve_student(&student)?;
    let clock = clock_from(options)?;
    let view = ReceivableService::by_student(&ctx.ledger, &ctx.roster, clock.as_ref(), student.id)?;
    formatters::print_student_receivables(&student.name, &view);
    Ok(())
}

fn receivable_dashboard(
    ctx: &mut ShellContext,
    options: &HashMap<String, String>,
) -> Result<(), CliError> {
    let clock = clock_from(options)?;
    let dashboard = ReceivableService::dashboard(&ctx.ledger, clock.as_ref());
    formatters::print_dashboard(&dashboard);
    Ok(())
}

fn ledger_new(ctx: &mut ShellContext, positional: &[String]) -> Result<(), CliError> {
    let [name] = expect_positional::<1>(positional, "ledger new <name>")?;
    ctx.ledger = Ledger::new(name);
    println!("switched to new ledger `{}`", ctx.ledger.name);
    Ok(())
}

fn ledger_load(ctx: &mut ShellContext, positional: &[String]) -> Result<(), CliError> {
    let [name] = expect_positional::<1>(positional, "ledger load <name>")?;
    ctx.ledger = ctx.storage.load_ledger(&name)?;
    println!("loaded ledger `{}`", ctx.ledger.name);
    Ok(())
}

/// Splits `--key value` options out of the token stream. Everything else
/// stays positional, in order.
fn split_options(args: &[String]) -> Result<(Vec<String>, HashMap<String, String>), CliError> {
    let mut positional = Vec::new();
    let mut options = HashMap::new();
    let mut iter = args.iter();
    while let Some(token) = iter.next() {
        if let Some(key) = token.strip_prefix("--") {
            let value = iter
                .next()
                .ok_or_else(|| CliError::Input(format!("option --{key} expects a value")))?;
            options.insert(key.to_string(), value.clone());
        } else {
            positional.push(token.clone());
        }
    }
    Ok((positional, options))
}

/// Returns exactly N positional arguments after the two command words.
fn expect_positional<const N: usize>(
    positional: &[String],
    usage: &str,
) -> Result<[String; N], CliError> {
    let rest = positional.get(2..).unwrap_or(&[]);
    if rest.len() != N {
        return Err(CliError::Input(format!("usage: {usage}")));
    }
    rest.to_vec()
        .try_into()
        .map_err(|_| CliError::Input(format!("usage: {usage}")))
}

fn clock_from(options: &HashMap<String, String>) -> Result<Box<dyn Clock>, CliError> {
    match options.get("today") {
        Some(date) => Ok(Box::new(FixedClock(parse_date(date)?))),
        None => Ok(Box::new(SystemClock)),
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, CliError> {
    Uuid::parse_str(value).map_err(|_| CliError::Input(format!("`{value}` is not a valid id")))
}

fn parse_amount(value: &str) -> Result<f64, CliError> {
    value
        .parse::<f64>()
        .map_err(|_| CliError::Input(format!("`{value}` is not a valid amount")))
}

fn parse_date(value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| CliError::Input(format!("`{value}` is not a YYYY-MM-DD date")))
}

fn parse_month(month: &str, year: &str) -> Result<BillingMonth, CliError> {
    let month: u32 = parse_number(month, "month")?;
    let year: i32 = parse_number(year, "year")?;
    BillingMonth::new(month, year)
        .ok_or_else(|| CliError::Input(format!("{year}-{month} is not a valid billing month")))
}

fn parse_number<T: std::str::FromStr>(value: &str, label: &str) -> Result<T, CliError> {
    value
        .parse::<T>()
        .map_err(|_| CliError::Input(format!("`{value}` is not a valid {label}")))
}

fn parse_status(value: &str) -> Result<PaymentStatus, CliError> {
    match value.to_lowercase().as_str() {
        "unpaid" => Ok(PaymentStatus::Unpaid),
        "partial" => Ok(PaymentStatus::Partial),
        other => Err(CliError::Input(format!(
            "`{other}` is not a listable status (unpaid or partial)"
        ))),
    }
}
