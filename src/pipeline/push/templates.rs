use crate::pipeline::scoring::Product;
use tracing::warn;

const DEFAULT_TEMPLATE: &str = "{name}, у вас персональное предложение: {product}. Посмотреть.";

/// Message template for a product id. Ids outside the catalog get the
/// generic offer naming the product.
pub(crate) fn template_for(product: &str) -> &'static str {
    match product.parse::<Product>() {
        Ok(product) => catalog_template(product),
        Err(err) => {
            warn!(%err, "using the generic push template");
            DEFAULT_TEMPLATE
        }
    }
}

const fn catalog_template(product: Product) -> &'static str {
    match product {
        Product::TravelCard => "{name}, за 3 месяца вы потратили {amount}, в том числе на поездки. С тревел-картой вернулось бы ≈{benefit}. Посмотреть условия.",
        Product::TaxiCard => "{name}, вы много ездите на такси. Карта для поездок вернёт ≈{benefit} с ваших расходов. Посмотреть.",
        Product::RestaurantsCard => "{name}, вы часто бываете в кафе. Карта с кешбэком на рестораны вернёт ≈{benefit}. Оформить карту.",
        Product::SupermarketCard => "{name}, покупки продуктов каждую неделю. Карта с кешбэком в супермаркетах даст ≈{benefit}. Посмотреть.",
        Product::PremiumCard => "{name}, ваш средний остаток {balance}. Премиальный пакет добавит сервисы и выгоду ≈{benefit}. Узнать подробнее.",
        Product::Deposit => "{name}, на депозите ваши {balance} приносили бы ≈{benefit} в месяц. Открыть депозит.",
        Product::CreditOffer => "{name}, по вашим покупкам на {amount} доступен кредит на выгодных условиях, ориентировочная польза ≈{benefit}. Посмотреть.",
        Product::FxOffer => "{name}, вы регулярно делаете переводы. Снизьте комиссии и сэкономьте ≈{benefit}. Узнать как.",
        Product::InvestmentOffer => "{name}, свободные {balance} могут работать на вас: ожидаемая доходность ≈{benefit} в месяц. Открыть счёт.",
        Product::GoldOffer => "{name}, вы покупаете украшения. Накопления в золоте дадут ≈{benefit}. Узнать больше.",
    }
}

/// Values substituted into a template.
#[derive(Debug, Clone)]
pub(crate) struct TemplateVars<'a> {
    pub name: &'a str,
    pub product: &'a str,
    pub amount: String,
    pub balance: String,
    pub benefit: String,
}

impl TemplateVars<'_> {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(self.name),
            "product" => Some(self.product),
            "amount" => Some(self.amount.as_str()),
            "balance" => Some(self.balance.as_str()),
            "benefit" => Some(self.benefit.as_str()),
            _ => None,
        }
    }
}

/// Single left-to-right substitution pass; substituted values are never
/// re-scanned, and unknown `{...}` sequences are copied verbatim.
pub(crate) fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => match vars.lookup(&after[..close]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(name: &'a str, product: &'a str) -> TemplateVars<'a> {
        TemplateVars {
            name,
            product,
            amount: "120 000 ₸".to_string(),
            balance: "250 000 ₸".to_string(),
            benefit: "4 000 ₸".to_string(),
        }
    }

    #[test]
    fn every_catalog_product_has_a_template() {
        for product in Product::ALL {
            assert_ne!(template_for(product.id()), DEFAULT_TEMPLATE);
        }
        assert_eq!(template_for("mortgage"), DEFAULT_TEMPLATE);
    }

    #[test]
    fn renders_placeholders_once() {
        let text = render(template_for("deposit"), &vars("Айгерим", "deposit"));
        assert_eq!(
            text,
            "Айгерим, на депозите ваши 250 000 ₸ приносили бы ≈4 000 ₸ в месяц. Открыть депозит."
        );
    }

    #[test]
    fn braces_in_values_are_not_expanded() {
        let text = render("{name}: {benefit}", &vars("{benefit}", "deposit"));
        assert_eq!(text, "{benefit}: 4 000 ₸");
    }

    #[test]
    fn unknown_placeholders_are_kept() {
        let text = render("{name} {city} {", &vars("Ерлан", "deposit"));
        assert_eq!(text, "Ерлан {city} {");
    }

    #[test]
    fn default_template_names_the_product() {
        let text = render(template_for("mortgage"), &vars("Ерлан", "mortgage"));
        assert_eq!(text, "Ерлан, у вас персональное предложение: mortgage. Посмотреть.");
    }
}
