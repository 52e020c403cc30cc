// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::trends::MAX_WINDOW;
use clap::builder::RangedI64ValueParser;
use clap::{Arg, ArgAction, Command, command, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn filter_args() -> [Arg; 7] {
    [
        Arg::new("from").long("from").help("Start date YYYY-MM-DD (needs --to)"),
        Arg::new("to").long("to").help("End date YYYY-MM-DD (needs --from)"),
        Arg::new("type").long("type").help("income|expense|all"),
        Arg::new("category").long("category").help("Exact category name"),
        Arg::new("min").long("min").help("Minimum amount, inclusive"),
        Arg::new("max").long("max").help("Maximum amount, inclusive"),
        Arg::new("search")
            .long("search")
            .short('s')
            .help("Case-insensitive text in description, category, sub-category or reference"),
    ]
}

fn transaction_fields(required: bool) -> [Arg; 8] {
    [
        Arg::new("date").long("date").required(required),
        Arg::new("description")
            .long("description")
            .visible_alias("desc")
            .required(required),
        Arg::new("amount").long("amount").required(required),
        Arg::new("type").long("type").required(required).help("income|expense"),
        Arg::new("category").long("category").required(required),
        Arg::new("sub").long("sub").help("Sub-category"),
        Arg::new("reference").long("reference").visible_alias("ref"),
        Arg::new("attachment").long("attachment"),
    ]
}

fn budget_fields(required: bool) -> [Arg; 6] {
    [
        Arg::new("category").long("category").required(required),
        Arg::new("type").long("type").required(required).help("income|expense"),
        Arg::new("amount")
            .long("amount")
            .required(required)
            .help("Planned amount"),
        Arg::new("period")
            .long("period")
            .required(required)
            .help("monthly|quarterly|yearly"),
        Arg::new("sub").long("sub").help("Sub-category"),
        Arg::new("description").long("description").visible_alias("desc"),
    ]
}

fn category_target() -> [Arg; 2] {
    [
        Arg::new("name").required(true).help("Category name or id"),
        Arg::new("type").long("type").help("income|expense, when the name is ambiguous"),
    ]
}

fn trend_window() -> RangedI64ValueParser<u16> {
    value_parser!(u16).range(0..=MAX_WINDOW as i64)
}

pub fn build_cli() -> Command {
    command!()
        .name("kasboard")
        .about("Cashflow tracking against a planned budget (RKA)")
        .subcommand(
            Command::new("init").about("Create the database").arg(
                Arg::new("demo")
                    .long("demo")
                    .action(ArgAction::SetTrue)
                    .help("Replace all records with the sample organization dataset"),
            ),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .args(transaction_fields(true)),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of a transaction")
                        .arg(Arg::new("id").required(true))
                        .args(transaction_fields(false)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(
                    Command::new("list")
                        .about("List transactions, newest entry first")
                        .args(filter_args())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Planned budget items (RKA)")
                .subcommand(
                    Command::new("add")
                        .about("Add a budget item")
                        .args(budget_fields(true)),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of a budget item")
                        .arg(Arg::new("id").required(true))
                        .args(budget_fields(false)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a budget item")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(
                    Command::new("list")
                        .about("List budget items")
                        .arg(Arg::new("type").long("type").help("income|expense|all"))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Categories and sub-categories")
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("type").long("type").required(true))
                        .arg(Arg::new("color").long("color").default_value("#6b7280")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List categories")
                        .arg(Arg::new("type").long("type").help("income|expense|all"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a category; records keep its name")
                        .args(category_target()),
                )
                .subcommand(
                    Command::new("sub")
                        .about("Add a sub-category")
                        .args(category_target())
                        .arg(Arg::new("sub").long("sub").required(true))
                        .arg(Arg::new("color").long("color").default_value("#9ca3af")),
                )
                .subcommand(
                    Command::new("enable")
                        .about("Offer the category for new entries")
                        .args(category_target()),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Stop offering the category for new entries")
                        .args(category_target()),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Budget vs actual reports")
                .subcommand(
                    Command::new("summary")
                        .about("Cashflow summary against the budget")
                        .arg(Arg::new("period").long("period").help("Label for the period"))
                        .args(filter_args())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("categories")
                        .about("Variance per category")
                        .args(filter_args())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("trends")
                        .about("Monthly income/expense ending at the current month")
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_parser(trend_window()),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("stats")
                        .about("Totals and counts of the matching transactions")
                        .args(filter_args())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("full")
                        .about("Summary, categories and trends as one JSON document")
                        .arg(Arg::new("period").long("period").help("Label for the period"))
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_parser(trend_window()),
                        )
                        .args(filter_args()),
                )
                .subcommand(
                    Command::new("forecast")
                        .about("Project net cashflow from recent monthly averages")
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .default_value("3")
                                .value_parser(value_parser!(u32))
                                .help("Calendar months to average, current one included"),
                        )
                        .arg(
                            Arg::new("ahead")
                                .long("ahead")
                                .default_value("3")
                                .value_parser(value_parser!(u32)),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("recent")
                        .about("Latest transactions by date")
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .default_value("8")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write records to a file")
                .subcommand(
                    Command::new("transactions")
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("categories")
                        .about("Export category records with their sub-categories")
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("report")
                        .about("Export the category variance report")
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Find orphaned or mismatched categories"))
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(Command::new("get").arg(Arg::new("key")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
}
