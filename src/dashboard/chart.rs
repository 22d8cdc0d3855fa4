//! The expenses by category donut chart.
//!
//! The chart is generated as JSON configuration for the ECharts library and
//! rendered as a container div followed by the script that initializes it.

use charming::{
    Chart,
    component::Legend,
    element::{Color, JsFunction, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::transaction::CategoryTotal;

/// The HTML element ID of the chart container.
pub(super) const CATEGORY_CHART_ID: &str = "category-chart";

const PALETTE: [&str; 10] = [
    "#ef4444", "#f97316", "#f59e0b", "#84cc16", "#22c55e", "#14b8a6", "#3b82f6", "#6366f1",
    "#a855f7", "#d946ef",
];

/// Build a donut chart of `category_totals`.
pub(super) fn category_chart(category_totals: &[CategoryTotal]) -> Chart {
    let data: Vec<(f64, &str)> = category_totals
        .iter()
        .map(|total| (total.amount, total.category.as_str()))
        .collect();

    Chart::new()
        .color(PALETTE.into_iter().map(Color::from).collect())
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom(0))
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

/// Renders the chart container, or a prompt when there are no expenses.
///
/// The initialization script is rendered next to the container so that the
/// chart is drawn again whenever HTMX swaps in new dashboard content.
pub(super) fn category_chart_view(category_totals: &[CategoryTotal]) -> Markup {
    if category_totals.is_empty() {
        return html!(
            p class="py-12 text-center text-sm text-gray-500 dark:text-gray-400"
            {
                "Add some expenses to see the category breakdown."
            }
        );
    }

    let options = category_chart(category_totals).to_string();

    html!(
        div
            id=(CATEGORY_CHART_ID)
            class="min-h-[320px] w-full"
        {}

        script { (PreEscaped(chart_script(CATEGORY_CHART_ID, &options))) }
    )
}

/// The script that draws the chart into the element with `id`.
///
/// `static/app.js` calls `window.redrawCategoryChart` when the theme or window size changes.
fn chart_script(id: &str, options: &str) -> String {
    // Category names are user input and must not be able to close the script tag.
    let options = options.replace("</", "<\\/");

    format!(
        r#"(function() {{
            const chartDom = document.getElementById("{id}");
            if (!chartDom || typeof echarts === 'undefined') {{
                return;
            }}
            const option = {options};
            option.backgroundColor = 'transparent';

            const draw = () => {{
                const existing = echarts.getInstanceByDom(chartDom);
                if (existing) {{
                    existing.dispose();
                }}
                const isDarkMode = document.documentElement.classList.contains('dark');
                echarts.init(chartDom, isDarkMode ? 'dark' : null).setOption(option);
            }};

            draw();
            window.redrawCategoryChart = draw;
        }})();"#
    )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::transaction::CategoryTotal;

    use super::{CATEGORY_CHART_ID, category_chart, category_chart_view};

    fn get_test_totals() -> Vec<CategoryTotal> {
        vec![
            CategoryTotal {
                category: "Food".to_owned(),
                amount: 120.0,
            },
            CategoryTotal {
                category: "Transport".to_owned(),
                amount: 30.5,
            },
        ]
    }

    #[test]
    fn chart_options_contain_categories_and_amounts() {
        let options = category_chart(&get_test_totals()).to_string();

        assert!(options.contains("\"pie\""), "not a pie chart: {options}");
        assert!(options.contains("\"Food\""));
        assert!(options.contains("\"Transport\""));
        assert!(options.contains("120"));
        assert!(options.contains("30.5"));
        assert!(options.contains("#ef4444"));
    }

    #[test]
    fn chart_is_a_donut() {
        let options = category_chart(&get_test_totals()).to_string();

        assert!(options.contains("\"40%\""));
        assert!(options.contains("\"70%\""));
    }

    #[test]
    fn renders_container_and_script() {
        let html = Html::parse_fragment(&category_chart_view(&get_test_totals()).into_string());

        let container = Selector::parse(&format!("#{CATEGORY_CHART_ID}")).unwrap();
        assert!(html.select(&container).next().is_some());
        let script = html
            .select(&Selector::parse("script").unwrap())
            .next()
            .expect("No chart script found");
        assert!(script.inner_html().contains("echarts.init"));
    }

    #[test]
    fn category_names_cannot_close_script_tag() {
        let totals = [CategoryTotal {
            category: "</script><b>".to_owned(),
            amount: 1.0,
        }];

        let html = category_chart_view(&totals).into_string();

        assert!(!html.contains("</script><b>"));
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn renders_prompt_without_expenses() {
        let html = category_chart_view(&[]).into_string();

        assert!(html.contains("Add some expenses to see the category breakdown."));
        assert!(!html.contains(CATEGORY_CHART_ID));
    }
}
