// Sample data installed on first start, so the lists are not empty

use crate::book::{Book, Result};
use crate::entities::{Claim, Client, PolicyType};
use crate::values::{parse_date, Description};

const SAMPLE_POLICY_TYPES: [(&str, &str, &str, &str); 3] = [
    ("Life Shield", "1001", "Whole life cover with critical illness rider", "1800.00"),
    ("Health Plus", "1002", "Hospitalisation and surgical", "640.50"),
    ("Motor Comprehensive", "2001", "Own damage, theft and third party", "1120.00"),
];

const SAMPLE_CLIENTS: [(&str, &str, &str, &str, &str, &str); 3] = [
    ("C001", "Alex Yeoh", "87438807", "alexyeoh@example.com", "Blk 30 Geylang Street 29", "1985-06-12"),
    ("C002", "Bernice Yu", "99272758", "berniceyu@example.com", "Blk 30 Lorong 3 Serangoon Gardens", "1992-02-29"),
    ("C003", "Charlotte Oliveiro", "93210283", "charlotte@example.com", "Blk 11 Ang Mo Kio Street 74", "1978-11-03"),
];

pub fn sample_book() -> Result<Book> {
    let mut book = Book::new();

    for (name, id, description, premium) in SAMPLE_POLICY_TYPES {
        book.add_policy_type(PolicyType::with_details(
            name.parse()?,
            id.parse()?,
            Some(Description::new(description)),
            Some(premium.parse()?),
        ))?;
    }

    for (id, name, phone, email, address, birthday) in SAMPLE_CLIENTS {
        book.add_client(Client::new(
            id.parse()?,
            name.parse()?,
            phone.parse()?,
            email.parse()?,
            address.parse()?,
            parse_date(birthday)?,
        ))?;
    }

    let alex = "C001".parse()?;
    book.add_policy("P1".parse()?, &alex, "1001".parse()?, parse_date("2030-01-01")?)?;
    book.add_policy("P2".parse()?, &alex, "2001".parse()?, parse_date("2026-12-31")?)?;
    book.add_claim(Claim::new(
        "CL1".parse()?,
        alex.clone(),
        "P2".parse()?,
        "850.00".parse()?,
        parse_date("2025-09-14")?,
        Description::new("Rear bumper repair"),
    ))?;

    let bernice = "C002".parse()?;
    book.add_policy("P1".parse()?, &bernice, "1002".parse()?, parse_date("2027-04-30")?)?;

    Ok(book)
}
