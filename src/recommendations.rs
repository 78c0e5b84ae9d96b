//! Curated reading recommendations shown on item pages.
//!
//! Lookup is by exact category name. Categories without a curated list get
//! [`DEFAULT_BOOKS`]. Links point at Amazon with the configured affiliate tag.

/// A curated book, identified by its Amazon ASIN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Book {
    pub title: &'static str,
    pub author: &'static str,
    pub asin: &'static str,
}

/// A book ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    pub url: String,
}

const fn book(title: &'static str, author: &'static str, asin: &'static str) -> Book {
    Book {
        title,
        author,
        asin,
    }
}

pub const DEFAULT_BOOKS: &[Book] = &[
    book("Designing Web APIs", "Brenda Jin", "1492026921"),
    book("RESTful Web APIs", "Leonard Richardson", "1449358063"),
];

const CURATED: &[(&str, &[Book])] = &[
    (
        "Development",
        &[
            book("Clean Code", "Robert C. Martin", "0132350882"),
            book("The Pragmatic Programmer", "David Thomas & Andrew Hunt", "0135957052"),
        ],
    ),
    (
        "Science",
        &[
            book("Python for Data Analysis", "Wes McKinney", "109810403X"),
            book("Automate the Boring Stuff with Python", "Al Sweigart", "1593279922"),
        ],
    ),
    (
        "Finance",
        &[
            book("Python for Finance", "Yves Hilpisch", "1492024333"),
            book("The Intelligent Investor", "Benjamin Graham", "0060555661"),
        ],
    ),
    (
        "Games",
        &[
            book("Game Programming Patterns", "Robert Nystrom", "0990582906"),
            book("Invent Your Own Computer Games with Python", "Al Sweigart", "1593277954"),
        ],
    ),
    (
        "Weather",
        &[
            book("Python Crash Course", "Eric Matthes", "1718502702"),
            book("Fluent Python", "Luciano Ramalho", "1492056359"),
        ],
    ),
    (
        "Music",
        &[book("Music and Technology", "Julio d'Escrivan", "1501356860")],
    ),
    (
        "Social",
        &[book("APIs: A Strategy Guide", "Daniel Jacobson", "1449308929")],
    ),
    (
        "Health",
        &[
            book("Python for Biologists", "Martin Jones", "1492346136"),
            book("Health Informatics", "Ramona Nelson", "0323402313"),
        ],
    ),
    (
        "Sports",
        &[
            book("Moneyball", "Michael Lewis", "0393324818"),
            book("Analyzing Baseball Data with R", "Max Marchi", "0367233517"),
        ],
    ),
    (
        "Transportation",
        &[book("Designing Data-Intensive Applications", "Martin Kleppmann", "1449373321")],
    ),
    (
        "Cloud & DevOps",
        &[
            book("The Phoenix Project", "Gene Kim", "1942788290"),
            book("Docker Deep Dive", "Nigel Poulton", "1916585256"),
        ],
    ),
    (
        "Machine Learning",
        &[
            book("Hands-On Machine Learning", "Aurélien Géron", "1098125975"),
            book("Deep Learning with Python", "François Chollet", "1617296864"),
        ],
    ),
    (
        "Cryptocurrency",
        &[
            book("Mastering Bitcoin", "Andreas Antonopoulos", "1491954388"),
            book("The Bitcoin Standard", "Saifedean Ammous", "1119473861"),
        ],
    ),
    (
        "Security",
        &[
            book("Black Hat Python", "Justin Seitz", "1718501129"),
            book("The Web Application Hacker's Handbook", "Dafydd Stuttard", "1118026470"),
        ],
    ),
    ("Education", &[book("Learning Python", "Mark Lutz", "1449355730")]),
    ("Government", &[book("Open Data Now", "Joel Gurin", "0071829776")]),
    ("Open Data", &[book("Open Data Now", "Joel Gurin", "0071829776")]),
    (
        "Utilities",
        &[book("Designing Web APIs", "Brenda Jin", "1492026921")],
    ),
];

/// Curated books for `category`, or the default list.
pub fn books_for(category: &str) -> &'static [Book] {
    CURATED
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, books)| *books)
        .unwrap_or(DEFAULT_BOOKS)
}

/// Recommendations for `category` with affiliate links.
pub fn recommendations_for(category: &str, affiliate_tag: &str) -> Vec<Recommendation> {
    books_for(category)
        .iter()
        .map(|b| Recommendation {
            title: b.title.to_string(),
            author: b.author.to_string(),
            url: format!("https://www.amazon.com/dp/{}?tag={}", b.asin, affiliate_tag),
        })
        .collect()
}
