//! Simulated inventory search.
//!
//! Stands in for a real inventory lookup: every search succeeds and draws
//! the assigned resource from the call's random generator.

use chrono::{Days, NaiveDate, Utc};
use domain::{
    Car, CarDetails, CarRequest, Flight, FlightDetails, FlightRequest, Hotel, HotelDetails,
    HotelRequest, Money, Resource,
};
use rand::Rng;
use rand::rngs::StdRng;

/// Finds a resource matching a reservation request.
pub trait Availability<R: Resource>: Send + Sync {
    fn search(&self, request: &R::Request, rng: &mut StdRng) -> R::Details;
}

/// Deterministic for a seeded generator, random otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAvailability;

const AIRLINES: &[(&str, &str)] = &[
    ("IB", "Iberia"),
    ("VY", "Vueling"),
    ("UX", "Air Europa"),
    ("FR", "Ryanair"),
];
const SEAT_LETTERS: &[char] = &['A', 'B', 'C', 'D', 'E', 'F'];
const HOTELS: &[&str] = &["Hotel Miramar", "Gran Hotel Central", "Casa Fuster", "Hotel Arts"];
const ROOM_TYPES: &[&str] = &["SINGLE", "DOUBLE", "SUITE"];
const RENTAL_COMPANIES: &[&str] = &["Hertz", "Avis", "Europcar", "Sixt"];
const CAR_MODELS: &[&str] = &["SEAT Ibiza", "Renault Clio", "Volkswagen Golf", "Toyota Corolla"];
const PLATE_LETTERS: &[char] = &[
    'B', 'C', 'D', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'R', 'S', 'T', 'V', 'W', 'X', 'Y',
    'Z',
];

/// Picks one item. `items` must not be empty.
fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn upcoming_date(rng: &mut StdRng) -> NaiveDate {
    let today = Utc::now().date_naive();
    today
        .checked_add_days(Days::new(rng.gen_range(1..=60)))
        .unwrap_or(today)
}

impl Availability<Flight> for SimulatedAvailability {
    fn search(&self, request: &FlightRequest, rng: &mut StdRng) -> FlightDetails {
        let (code, airline) = *pick(rng, AIRLINES);

        FlightDetails {
            airline: airline.to_string(),
            flight_number: format!("{code}{:04}", rng.gen_range(1..=9999)),
            seat: format!("{}{}", rng.gen_range(1..=40), pick(rng, SEAT_LETTERS)),
            departure_date: request
                .departure_date
                .unwrap_or_else(|| upcoming_date(rng)),
            departure_time: format!(
                "{:02}:{:02}",
                rng.gen_range(6..=22),
                pick(rng, &[0, 15, 30, 45])
            ),
            price: Money::from_cents(rng.gen_range(4_000..=45_000)),
        }
    }
}

impl Availability<Hotel> for SimulatedAvailability {
    fn search(&self, request: &HotelRequest, rng: &mut StdRng) -> HotelDetails {
        let nightly_rate = Money::from_units(rng.gen_range(60..=320));

        HotelDetails {
            hotel_name: format!("{} {}", pick(rng, HOTELS), request.city.trim()),
            room_number: format!("{}{:02}", rng.gen_range(1..=12), rng.gen_range(1..=30)),
            room_type: pick(rng, ROOM_TYPES).to_string(),
            nightly_rate,
            total_price: nightly_rate.multiply(request.nights()),
        }
    }
}

impl Availability<Car> for SimulatedAvailability {
    fn search(&self, request: &CarRequest, rng: &mut StdRng) -> CarDetails {
        let daily_rate = Money::from_units(rng.gen_range(25..=110));
        let letters: String = (0..3).map(|_| *pick(rng, PLATE_LETTERS)).collect();

        CarDetails {
            company: pick(rng, RENTAL_COMPANIES).to_string(),
            model: pick(rng, CAR_MODELS).to_string(),
            license_plate: format!("{:04}-{letters}", rng.gen_range(0..=9999)),
            daily_rate,
            total_price: daily_rate.multiply(request.rental_days()),
        }
    }
}
