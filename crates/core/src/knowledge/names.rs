//! Decorative tables for names and addresses.
//!
//! None of these values carry clinical meaning; they only make records look lived-in.

pub const MALE_FIRST_NAMES: &[&str] = &[
    "Albert", "Arthur", "Bernard", "Carl", "Charles", "Clarence", "Donald", "Earl", "Edward",
    "Eugene", "Frank", "Fred", "George", "Harold", "Henry", "Howard", "James", "John", "Joseph",
    "Kenneth", "Lawrence", "Leonard", "Louis", "Ralph", "Raymond", "Richard", "Robert", "Roy",
    "Stanley", "Thomas", "Walter", "William",
];

pub const FEMALE_FIRST_NAMES: &[&str] = &[
    "Alice", "Anna", "Barbara", "Betty", "Carol", "Dolores", "Doris", "Dorothy", "Edna", "Evelyn",
    "Florence", "Frances", "Gladys", "Gloria", "Helen", "Irene", "Jean", "Joan", "Josephine",
    "June", "Lillian", "Lois", "Margaret", "Marie", "Marilyn", "Martha", "Mary", "Mildred",
    "Norma", "Patricia", "Ruth", "Shirley", "Virginia",
];

pub const LAST_NAMES: &[&str] = &[
    "Adams", "Allen", "Anderson", "Baker", "Bennett", "Brooks", "Brown", "Campbell", "Carter",
    "Clark", "Collins", "Cook", "Davis", "Edwards", "Evans", "Fisher", "Foster", "Garcia", "Gray",
    "Green", "Hall", "Harris", "Hughes", "Jackson", "Johnson", "Kelly", "King", "Lee", "Lewis",
    "Martin", "Miller", "Mitchell", "Moore", "Morgan", "Murphy", "Nelson", "Parker", "Perry",
    "Phillips", "Reed", "Roberts", "Rogers", "Russell", "Scott", "Stewart", "Sullivan", "Taylor",
    "Thompson", "Turner", "Walker", "Ward", "Watson", "White", "Williams", "Wilson", "Wright",
    "Young",
];

pub const NAME_SUFFIXES: &[&str] = &["Jr.", "Sr.", "II", "III", "IV"];

pub const STREET_NAMES: &[&str] = &[
    "Maple", "Oak", "Cedar", "Elm", "Pine", "Washington", "Lake", "Hill", "Park", "Church",
    "Walnut", "Spring", "Ridge", "Highland", "Sunset", "Jefferson", "Franklin", "Mill",
];

pub const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Drive", "Court"];

/// City, state and the first three digits of its postal codes.
pub const CITIES: &[(&str, &str, &str)] = &[
    ("Baltimore", "Maryland", "212"),
    ("Annapolis", "Maryland", "214"),
    ("Washington", "District of Columbia", "200"),
    ("Arlington", "Virginia", "222"),
    ("Richmond", "Virginia", "232"),
    ("Philadelphia", "Pennsylvania", "191"),
    ("Pittsburgh", "Pennsylvania", "152"),
    ("Columbus", "Ohio", "432"),
    ("Boston", "Massachusetts", "021"),
    ("Rochester", "Minnesota", "559"),
    ("Los Angeles", "California", "900"),
    ("New York", "New York", "100"),
    ("Raleigh", "North Carolina", "276"),
    ("Atlanta", "Georgia", "303"),
];

pub const EMAIL_DOMAINS: &[&str] = &["example.com", "example.net", "example.org"];
