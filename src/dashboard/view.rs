//! HTML rendering for the dashboard.
//!
//! The page is split into a static header and the `#dashboard-content`
//! element, which holds the summary cards, the new transaction form, the
//! transaction table and the category chart. HTMX requests re-render only
//! the content.

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    dashboard::{chart::category_chart_view, store::DashboardStore},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles,
        format_currency, loading_spinner,
    },
    transaction::{Totals, Transaction, TransactionType},
};

/// The ID of the element that HTMX requests swap their response into.
const DASHBOARD_CONTENT_ID: &str = "dashboard-content";
const DASHBOARD_CONTENT_SELECTOR: &str = "#dashboard-content";

const INCOME_TEXT_STYLE: &str = "text-green-600 dark:text-green-400";
const EXPENSE_TEXT_STYLE: &str = "text-red-600 dark:text-red-400";

/// Renders the full dashboard page.
pub(super) fn dashboard_page(store: &DashboardStore) -> Markup {
    let content = html!(
        div class="flex flex-col gap-8 px-4 py-8 mx-auto max-w-screen-lg text-gray-900 dark:text-white"
        {
            header class="flex flex-col gap-4 sm:flex-row sm:items-center sm:justify-between"
            {
                div
                {
                    h1 class="text-3xl font-semibold" { "Money Tracker" }
                    p class="mt-1 text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Add, review and manage your income and expenses."
                    }
                }

                (theme_toggle())
            }

            div id=(DASHBOARD_CONTENT_ID) class="flex flex-col gap-8"
            {
                (dashboard_content(store))
            }
        }
    );

    let head_elements = [
        HeadElement::ScriptLink(
            "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js".to_owned(),
        ),
        dollar_input_styles(),
    ];

    base("Dashboard", &head_elements, &content)
}

/// Renders the contents of `#dashboard-content` for HTMX updates.
pub(super) fn dashboard_content(store: &DashboardStore) -> Markup {
    html!(
        (summary_cards(store.totals()))
        (transaction_form(store))
        (transaction_table(store.transactions()))

        section class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold" { "Expenses by Category" }
            p class="mt-1 mb-4 text-sm text-gray-500 dark:text-gray-400"
            {
                "See where your money goes."
            }

            (category_chart_view(&store.expenses_by_category()))
        }
    )
}

fn theme_toggle() -> Markup {
    html!(
        button
            type="button"
            id="theme-toggle"
            aria-label="Toggle color mode"
            class="flex items-center gap-2 rounded-full border border-gray-200
                bg-white px-4 py-2 text-sm font-medium text-gray-700 shadow
                hover:bg-gray-100 dark:border-gray-700 dark:bg-gray-800
                dark:text-gray-200 dark:hover:bg-gray-700"
        {
            span class="dark:hidden" { "Dark mode" }
            span class="hidden dark:inline" { "Light mode" }
        }
    )
}

fn summary_cards(totals: Totals) -> Markup {
    let balance_style = if totals.balance >= 0.0 {
        INCOME_TEXT_STYLE
    } else {
        EXPENSE_TEXT_STYLE
    };

    let cards = [
        ("total-income", "Total Income", totals.income, INCOME_TEXT_STYLE),
        ("total-expense", "Total Expenses", totals.expense, EXPENSE_TEXT_STYLE),
        ("balance", "Balance", totals.balance, balance_style),
    ];

    html!(
        section class="grid gap-4 sm:grid-cols-3"
        {
            @for (id, label, amount, style) in cards {
                div class=(CARD_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                    p id=(id) class={ "mt-2 text-2xl font-semibold " (style) }
                    {
                        (format_currency(amount))
                    }
                }
            }
        }
    )
}

fn transaction_form(store: &DashboardStore) -> Markup {
    let form = store.form();
    let type_options = [
        (TransactionType::Expense, "type-expense", "Expense"),
        (TransactionType::Income, "type-income", "Income"),
    ];

    html!(
        section class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold" { "Add Transaction" }
            p class="mt-1 text-sm text-gray-500 dark:text-gray-400"
            {
                "Record income or an expense. The totals update automatically."
            }

            form
                hx-post=(endpoints::DASHBOARD_TRANSACTIONS)
                hx-target=(DASHBOARD_CONTENT_SELECTOR)
                hx-target-error=(DASHBOARD_CONTENT_SELECTOR)
                hx-swap="innerHTML"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="mt-6 grid gap-4 sm:grid-cols-2"
            {
                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    div class="input-wrapper"
                    {
                        input
                            type="number"
                            name="amount"
                            id="amount"
                            min="0"
                            step="0.01"
                            placeholder="0.00"
                            required
                            value=(form.amount)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    input
                        type="text"
                        name="category"
                        id="category"
                        placeholder="e.g. Food"
                        required
                        value=(form.category)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    div class="flex gap-3"
                    {
                        @for (type_, id, label) in type_options {
                            label for=(id) class="flex-1"
                            {
                                input
                                    type="radio"
                                    name="type"
                                    id=(id)
                                    value=(type_.as_str())
                                    required
                                    checked[form.type_ == type_]
                                    class=(FORM_RADIO_INPUT_STYLE);

                                span class={ "block text-center " (FORM_RADIO_LABEL_STYLE) }
                                {
                                    (label)
                                }
                            }
                        }
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        type="date"
                        name="date"
                        id="date"
                        required
                        value=(form.date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="sm:col-span-2"
                {
                    label for="note" class=(FORM_LABEL_STYLE) { "Note" }

                    textarea
                        name="note"
                        id="note"
                        rows="2"
                        placeholder="Optional"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (form.note)
                    }
                }

                @if let Some(error) = store.error() {
                    p
                        role="alert"
                        class="sm:col-span-2 rounded border border-red-200 bg-red-50 px-4 py-2
                            text-sm text-red-600 dark:border-red-700 dark:bg-red-500/10 dark:text-red-200"
                    {
                        (error)
                    }
                }

                div class="sm:col-span-2 flex justify-end"
                {
                    button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span class="inline htmx-indicator" id="indicator"
                        {
                            (loading_spinner())
                        }
                        "Add Transaction"
                    }
                }
            }
        }
    )
}

fn transaction_table(transactions: &[Transaction]) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold" { "Transactions" }

            div class="mt-6 overflow-x-auto rounded"
            {
                @if transactions.is_empty() {
                    p class="px-6 py-12 text-center text-sm text-gray-500 dark:text-gray-400"
                    {
                        "No transactions yet. Add your first one above!"
                    }
                } @else {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction))
                            }
                        }
                    }
                }
            }
        }
    )
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let (sign, amount_style) = match transaction.type_ {
        TransactionType::Income => ("+", INCOME_TEXT_STYLE),
        TransactionType::Expense => ("-", EXPENSE_TEXT_STYLE),
    };
    let note = transaction
        .note
        .as_deref()
        .filter(|note| !note.is_empty())
        .unwrap_or("-");
    let delete_url = format_endpoint(endpoints::DASHBOARD_TRANSACTION, transaction.id);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                (transaction.date.to_offset(UtcOffset::UTC).date())
            }
            td class={ (TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white" }
            {
                (transaction.category)
            }
            td class=(TABLE_CELL_STYLE) { (note) }
            td class={ (TABLE_CELL_STYLE) " text-right font-semibold " (amount_style) }
            {
                (sign) (format_currency(transaction.amount))
            }
            td class={ (TABLE_CELL_STYLE) " text-right" }
            {
                button
                    hx-delete=(delete_url)
                    hx-target=(DASHBOARD_CONTENT_SELECTOR)
                    hx-target-error=(DASHBOARD_CONTENT_SELECTOR)
                    hx-swap="innerHTML"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    )
}
