/// One numbered finding with its optional action items.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub finding: &'static str,
    pub details: &'static [&'static str],
    pub recommendations: &'static [&'static str],
}

/// Footer shown under every view.
pub const CREDIT: &str = "Developed by: Amr Shawky";

pub const OBSERVATIONS: [Observation; 10] = [
    Observation {
        finding: "Total Spent and Price Per Unit are both concentrated at the low end: \
                  most transactions happen at lower price points, so customers are price-sensitive.",
        details: &[],
        recommendations: &["Discounts and promotions can push moderate spenders to buy more."],
    },
    Observation {
        finding: "A few categories, such as Furniture, Food and Electric Household Essentials, \
                  receive more orders than the rest.",
        details: &[],
        recommendations: &[],
    },
    Observation {
        finding: "Cash is slightly the most common payment method, but usage is spread fairly \
                  evenly across methods.",
        details: &[],
        recommendations: &[],
    },
    Observation {
        finding: "Sales peak in particular months; January and July are highest, likely driven \
                  by holidays.",
        details: &[],
        recommendations: &["Schedule marketing campaigns and discounts around the high-sales months."],
    },
    Observation {
        finding: "A handful of products dominate quantity sold.",
        details: &[],
        recommendations: &["Keep best sellers in stock to avoid shortages; milk products are a prime example."],
    },
    Observation {
        finding: "Products priced roughly between 15 and 30 are bought in the largest quantities.",
        details: &[],
        recommendations: &[
            "For high-priced items, offer installment plans or financing.",
            "For low-priced, high-volume items, introduce bulk discounts.",
        ],
    },
    Observation {
        finding: "Online transactions generally carry a higher total spend.",
        details: &[],
        recommendations: &["Use in-store promotions to lift the basket size of in-store customers."],
    },
    Observation {
        finding: "Spending differs slightly by payment method within categories.",
        details: &[
            "Beverages and Butchers: credit card users spend a little more.",
            "Computers & Accessories and Electric Household Essentials: digital wallet users spend a little more.",
        ],
        recommendations: &[],
    },
    Observation {
        finding: "Correlations between the numeric columns:",
        details: &[
            "Price Per Unit vs Total Spent: moderately positive, pricier items raise the total.",
            "Quantity vs Total Spent: strongly positive, quantity drives total spending.",
            "Price Per Unit vs Quantity: no meaningful correlation, price does not change how many units are bought.",
        ],
        recommendations: &[],
    },
    Observation {
        finding: "Customer CLV against Transaction Count:",
        details: &[
            "Trend: a positive linear relationship, customers with more transactions have higher CLV.",
            "Anomaly: some customers reach a high CLV with few transactions, pointing to high-value purchases.",
        ],
        recommendations: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_observation_has_a_finding() {
        assert!(OBSERVATIONS.iter().all(|o| !o.finding.is_empty()));
        let with_actions = OBSERVATIONS
            .iter()
            .filter(|o| !o.recommendations.is_empty())
            .count();
        assert_eq!(with_actions, 5);
    }
}
