use aurora::{
    ErrorKind,
    number::{PromotedFloat, PromotedInt},
};
use num_bigint::BigInt;
use rust_decimal::Decimal;

fn int(text: &str) -> PromotedInt {
    PromotedInt::parse(text).expect("integer parses")
}

#[test]
fn integers_land_on_the_narrowest_rung() {
    assert_eq!(int("5").rank(), "Int32");
    assert_eq!(int("-2147483648").rank(), "Int32");
    assert_eq!(int("3000000000").rank(), "Int64");
    assert_eq!(int("9223372036854775808").rank(), "BigInt");
    assert_eq!(
        PromotedInt::parse("12a").expect_err("not a number").kind(),
        Some(ErrorKind::OutOfRange)
    );
}

#[test]
fn integer_overflow_promotes_instead_of_wrapping() {
    let sum = &int("2147483647") + &int("1");
    assert_eq!(sum.rank(), "Int64");
    assert_eq!(sum, PromotedInt::from(2_147_483_648i64));

    let product = &int("9223372036854775807") * &int("2");
    assert_eq!(product.rank(), "BigInt");
    assert_eq!(product.to_string(), "18446744073709551614");

    let difference = &int("-2147483648") - &int("1");
    assert_eq!(difference.rank(), "Int64");
}

#[test]
fn integer_pairs_follow_the_wider_rung() {
    assert_eq!((&int("2") + &int("3")).rank(), "Int32");
    assert_eq!((&int("2") + &int("3000000000")).rank(), "Int64");
    let big = PromotedInt::from(BigInt::from(4));
    let sum = &big + &int("1");
    assert_eq!(sum.rank(), "BigInt");
    assert_eq!(sum, PromotedInt::from(5));
}

#[test]
fn floats_try_single_precision_first() {
    let single = PromotedFloat::parse("1.5").expect("parses");
    assert_eq!(single.rank(), "Single");
    let double = PromotedFloat::parse("1e300").expect("parses");
    assert_eq!(double.rank(), "Double");
}

#[test]
fn mixed_arithmetic_result_table() {
    let single = PromotedFloat::from(0.5f32);
    let double = PromotedFloat::from(0.5f64);

    assert_eq!((&int("1") + &single).rank(), "Single");
    assert_eq!((&int("3000000000") + &single).rank(), "Single");
    assert_eq!((&PromotedInt::from(BigInt::from(1)) + &single).rank(), "Double");
    assert_eq!((&int("1") + &double).rank(), "Double");
    assert_eq!((&single + &double).rank(), "Double");
    assert_eq!((&single * &int("4")).rank(), "Single");
    assert_eq!(&single * &int("4"), PromotedFloat::from(2.0f32));
}

#[test]
fn decimals_stay_decimal_only_with_each_other() {
    let a = PromotedFloat::from(Decimal::new(15, 1));
    let b = PromotedFloat::from(Decimal::new(25, 1));
    let sum = &a + &b;
    assert_eq!(sum.rank(), "Decimal");
    assert_eq!(sum, PromotedFloat::from(Decimal::new(4, 0)));
    assert_eq!((&a + &PromotedFloat::from(1.0f32)).rank(), "Double");
}

#[test]
fn integers_lower_onto_the_float_ladder() {
    let value = int("6").to_float().expect("converts");
    assert_eq!(value.rank(), "Single");
    assert_eq!(value, PromotedFloat::from(6.0f32));
}

#[test]
fn comparisons_cross_ladders() {
    assert!(int("3") < PromotedFloat::from(3.5f32));
    assert!(PromotedFloat::from(2.5f64) > int("2"));
    assert!(int("2") == PromotedFloat::from(2.0f32));
    assert!(int("99999999999999999999") > int("3000000000"));
    assert!(int("-1") < int("0"));
}

#[test]
fn zero_detection() {
    assert!(int("0").is_zero());
    assert!(PromotedFloat::from(0.0f64).is_zero());
    assert!(PromotedFloat::from(Decimal::ZERO).is_zero());
    assert!(!int("7").is_zero());
}
