//! Discount normalizer step definitions.

use std::sync::Arc;

use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use invoicing::discount::{Discount, DiscountType};
use invoicing::money::{Currency, Money, MoneyFormatter};
use invoicing::serializer::{
    Denormalizer, DiscountNormalizer, MoneyNormalizer, Normalizer, ParentSerializer, Serializer,
};
use serde_json::Value;

/// Test context for discount normalizer scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct DiscountNormalizerWorld {
    normalizer: Option<DiscountNormalizer>,
    discount: Discount,
    normalized: Option<Value>,
    denormalized: Option<Discount>,
    supported: Option<bool>,
    last_error: Option<String>,
}

impl std::fmt::Debug for DiscountNormalizerWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscountNormalizerWorld")
            .field("discount", &self.discount)
            .field("normalized", &self.normalized)
            .field("denormalized", &self.denormalized)
            .field("supported", &self.supported)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl DiscountNormalizerWorld {
    fn new() -> Self {
        Self {
            normalizer: None,
            discount: Discount::default(),
            normalized: None,
            denormalized: None,
            supported: None,
            last_error: None,
        }
    }

    fn normalizer(&self) -> &DiscountNormalizer {
        self.normalizer
            .as_ref()
            .expect("Discount normalizer not initialized")
    }
}

fn docstring_json(step: &Step) -> Value {
    let raw = step.docstring.as_deref().expect("Step requires a JSON doc string");
    serde_json::from_str(raw).expect("Doc string is not valid JSON")
}

// --- Background ---

#[given(expr = "a discount normalizer for currency {string} and locale {string}")]
async fn given_normalizer(world: &mut DiscountNormalizerWorld, currency: String, locale: String) {
    let currency = Currency::new(&currency).expect("Invalid currency");
    let formatter = MoneyFormatter::new(&locale, currency.clone()).expect("Invalid locale");
    let money: Arc<dyn ParentSerializer> = Arc::new(MoneyNormalizer);
    let parent: Arc<dyn ParentSerializer> = Arc::new(Serializer::new(vec![money]));
    world.normalizer = Some(DiscountNormalizer::new(parent, formatter, currency));
}

// --- Given steps ---

#[given(expr = "a {word} discount of {int}")]
async fn given_discount(world: &mut DiscountNormalizerWorld, discount_type: String, value: i64) {
    let discount_type: DiscountType = discount_type.parse().expect("Unknown discount type");
    world.discount = Discount::new(discount_type, value);
}

// --- When steps ---

#[when("I ask whether the discount can be normalized")]
async fn when_supports_discount(world: &mut DiscountNormalizerWorld) {
    let discount = world.discount.clone();
    world.supported = Some(world.normalizer().supports_normalization(&discount));
}

#[when(expr = "I ask whether the string {string} can be normalized")]
async fn when_supports_string(world: &mut DiscountNormalizerWorld, name: String) {
    world.supported = Some(world.normalizer().supports_normalization(&name));
}

#[when(expr = "I ask whether a money amount of {int} {word} can be normalized")]
async fn when_supports_money(world: &mut DiscountNormalizerWorld, amount: i64, code: String) {
    let money = Money::new(amount, Currency::new(&code).expect("Invalid currency"));
    world.supported = Some(world.normalizer().supports_normalization(&money));
}

#[when(expr = "I ask whether this payload can be denormalized into {string}:")]
async fn when_supports_denormalization(
    world: &mut DiscountNormalizerWorld,
    target: String,
    step: &Step,
) {
    let data = docstring_json(step);
    world.supported = Some(world.normalizer().supports_denormalization(&data, &target));
}

#[when("I normalize the discount")]
async fn when_normalize(world: &mut DiscountNormalizerWorld) {
    let discount = world.discount.clone();
    match world.normalizer().normalize(&discount) {
        Ok(value) => world.normalized = Some(value),
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[when("I denormalize into a discount:")]
async fn when_denormalize(world: &mut DiscountNormalizerWorld, step: &Step) {
    let data = docstring_json(step);
    match world.normalizer().denormalize_discount(&data) {
        Ok(discount) => world.denormalized = Some(discount),
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

// --- Then steps ---

#[then("it is supported")]
async fn then_supported(world: &mut DiscountNormalizerWorld) {
    assert_eq!(world.supported, Some(true));
}

#[then("it is not supported")]
async fn then_not_supported(world: &mut DiscountNormalizerWorld) {
    assert_eq!(world.supported, Some(false));
}

#[then("the normalized discount is:")]
async fn then_normalized_is(world: &mut DiscountNormalizerWorld, step: &Step) {
    assert_eq!(world.normalized.as_ref(), Some(&docstring_json(step)));
}

#[then(expr = "the discount is a {word} discount of {int}")]
async fn then_denormalized_is(world: &mut DiscountNormalizerWorld, discount_type: String, value: i64) {
    let discount_type: DiscountType = discount_type.parse().expect("Unknown discount type");
    assert_eq!(
        world.denormalized,
        Some(Discount::new(discount_type, value)),
        "last error: {:?}",
        world.last_error
    );
}

#[then("the discount has no type and a value of 0")]
async fn then_denormalized_empty(world: &mut DiscountNormalizerWorld) {
    assert_eq!(world.denormalized, Some(Discount::default()));
}

#[then(expr = "the discount is described as {string}")]
async fn then_described_as(world: &mut DiscountNormalizerWorld, expected: String) {
    assert_eq!(world.normalizer().describe(&world.discount), expected);
}

#[then("denormalization fails")]
async fn then_denormalization_fails(world: &mut DiscountNormalizerWorld) {
    assert!(world.denormalized.is_none());
    assert!(world.last_error.is_some());
}
