//! Attribute schema.
//!
//! The schema is the fixed vocabulary the form offers: every categorical
//! attribute of a mushroom, the single-letter codes it may take, and the
//! human-readable label of each code. It is defined once as static data and
//! shared process-wide through [`AttributeSchema::mushroom`].
//!
//! # Example
//!
//! ```
//! use sporecast::schema::AttributeSchema;
//!
//! let schema = AttributeSchema::mushroom();
//! let odor = schema.attribute("odor").unwrap();
//! assert_eq!(odor.display_name(), "Odor");
//! assert_eq!(odor.category("f").unwrap().label, "Foul");
//! ```

use serde::Serialize;

// =============================================================================
// Category / Attribute
// =============================================================================

/// One valid value of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Code as it appears in the trained feature columns (e.g. `"f"`).
    pub code: &'static str,
    /// Human-readable label (e.g. `"Foul"`).
    pub label: &'static str,
}

/// A categorical attribute and its valid codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute name as used in column prefixes (e.g. `"cap-shape"`).
    pub name: &'static str,
    /// One-line description shown next to the control.
    pub description: &'static str,
    /// Valid codes, in presentation order.
    pub categories: &'static [Category],
}

impl Attribute {
    /// Form label: hyphens become spaces, first letter upper-cased, the rest
    /// lower-cased (`"stalk-root"` → `"Stalk root"`).
    pub fn display_name(&self) -> String {
        let spaced = self.name.replace('-', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }

    /// Look up a category by code.
    pub fn category(&self, code: &str) -> Option<&'static Category> {
        self.categories.iter().find(|c| c.code == code)
    }

    /// Returns true if `code` is one of this attribute's codes.
    #[inline]
    pub fn has_code(&self, code: &str) -> bool {
        self.category(code).is_some()
    }
}

// =============================================================================
// AttributeSchema
// =============================================================================

/// The full, immutable set of attributes.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct AttributeSchema {
    attributes: &'static [Attribute],
}

impl AttributeSchema {
    /// Build a schema over a static attribute table.
    ///
    /// Attribute names must be unique and free of `_`, since `_` separates
    /// the attribute from the code in a feature column name.
    pub const fn new(attributes: &'static [Attribute]) -> Self {
        Self { attributes }
    }

    /// The built-in mushroom schema.
    pub fn mushroom() -> &'static AttributeSchema {
        &MUSHROOM
    }

    /// All attributes in declaration order.
    #[inline]
    pub fn attributes(&self) -> &'static [Attribute] {
        self.attributes
    }

    /// Number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the schema has no attributes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&'static Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Position of an attribute in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Attribute names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().map(|a| a.name)
    }
}

// =============================================================================
// Mushroom Tables
// =============================================================================

macro_rules! categories {
    ($($code:literal => $label:literal),+ $(,)?) => {
        &[$(Category { code: $code, label: $label }),+]
    };
}

const SURFACE: &[Category] = categories! {
    "f" => "Fibrous", "y" => "Scaly", "k" => "Silky", "s" => "Smooth",
};

const STALK_COLOR: &[Category] = categories! {
    "n" => "Brown", "b" => "Buff", "c" => "Cinnamon", "g" => "Gray", "o" => "Orange",
    "p" => "Pink", "e" => "Red", "w" => "White", "y" => "Yellow",
};

const MUSHROOM_ATTRIBUTES: &[Attribute] = &[
    Attribute {
        name: "cap-shape",
        description: "Overall profile of the cap seen from the side.",
        categories: categories! {
            "b" => "Bell", "c" => "Conical", "x" => "Convex", "f" => "Flat",
            "k" => "Knobbed", "s" => "Sunken",
        },
    },
    Attribute {
        name: "cap-surface",
        description: "Texture of the top of the cap.",
        categories: categories! {
            "f" => "Fibrous", "g" => "Grooves", "y" => "Scaly", "s" => "Smooth",
        },
    },
    Attribute {
        name: "cap-color",
        description: "Dominant colour of the cap.",
        categories: categories! {
            "n" => "Brown", "b" => "Buff", "c" => "Cinnamon", "g" => "Gray", "r" => "Green",
            "p" => "Pink", "u" => "Purple", "e" => "Red", "w" => "White", "y" => "Yellow",
        },
    },
    Attribute {
        name: "bruises",
        description: "Whether the flesh bruises when handled.",
        categories: categories! { "t" => "Bruises", "f" => "No" },
    },
    Attribute {
        name: "odor",
        description: "Smell of the fresh mushroom.",
        categories: categories! {
            "a" => "Almond", "l" => "Anise", "c" => "Creosote", "y" => "Fishy", "f" => "Foul",
            "m" => "Musty", "n" => "None", "p" => "Pungent", "s" => "Spicy",
        },
    },
    Attribute {
        name: "gill-attachment",
        description: "How the gills meet the stalk.",
        categories: categories! { "a" => "Attached", "f" => "Free" },
    },
    Attribute {
        name: "gill-spacing",
        description: "Distance between neighbouring gills.",
        categories: categories! { "c" => "Close", "w" => "Crowded" },
    },
    Attribute {
        name: "gill-size",
        description: "Width of the individual gills.",
        categories: categories! { "b" => "Broad", "n" => "Narrow" },
    },
    Attribute {
        name: "gill-color",
        description: "Colour of the gills under the cap.",
        categories: categories! {
            "k" => "Black", "n" => "Brown", "b" => "Buff", "h" => "Chocolate", "g" => "Gray",
            "r" => "Green", "o" => "Orange", "p" => "Pink", "u" => "Purple", "e" => "Red",
            "w" => "White", "y" => "Yellow",
        },
    },
    Attribute {
        name: "stalk-shape",
        description: "Whether the stalk widens or narrows toward the base.",
        categories: categories! { "e" => "Enlarging", "t" => "Tapering" },
    },
    Attribute {
        name: "stalk-root",
        description: "Shape of the stalk base below ground.",
        categories: categories! {
            "b" => "Bulbous", "c" => "Club", "u" => "Cup", "e" => "Equal",
            "z" => "Rhizomorphs", "r" => "Rooted", "?" => "Missing",
        },
    },
    Attribute {
        name: "stalk-surface-above-ring",
        description: "Texture of the stalk above the ring.",
        categories: SURFACE,
    },
    Attribute {
        name: "stalk-surface-below-ring",
        description: "Texture of the stalk below the ring.",
        categories: SURFACE,
    },
    Attribute {
        name: "stalk-color-above-ring",
        description: "Colour of the stalk above the ring.",
        categories: STALK_COLOR,
    },
    Attribute {
        name: "stalk-color-below-ring",
        description: "Colour of the stalk below the ring.",
        categories: STALK_COLOR,
    },
    Attribute {
        name: "veil-type",
        description: "Whether the veil covers only part of the cap or the whole fruiting body.",
        categories: categories! { "p" => "Partial", "u" => "Universal" },
    },
    Attribute {
        name: "veil-color",
        description: "Colour of the veil remnants.",
        categories: categories! {
            "n" => "Brown", "o" => "Orange", "w" => "White", "y" => "Yellow",
        },
    },
    Attribute {
        name: "ring-number",
        description: "Number of rings on the stalk.",
        categories: categories! { "n" => "None", "o" => "One", "t" => "Two" },
    },
    Attribute {
        name: "ring-type",
        description: "Form of the ring on the stalk.",
        categories: categories! {
            "c" => "Cobwebby", "e" => "Evanescent", "f" => "Flaring", "l" => "Large",
            "n" => "None", "p" => "Pendant", "s" => "Sheathing", "z" => "Zone",
        },
    },
    Attribute {
        name: "spore-print-color",
        description: "Colour of the spore print left on paper.",
        categories: categories! {
            "k" => "Black", "n" => "Brown", "b" => "Buff", "h" => "Chocolate", "r" => "Green",
            "o" => "Orange", "u" => "Purple", "w" => "White", "y" => "Yellow",
        },
    },
    Attribute {
        name: "population",
        description: "How the mushrooms grow relative to each other.",
        categories: categories! {
            "a" => "Abundant", "c" => "Clustered", "n" => "Numerous", "s" => "Scattered",
            "v" => "Several", "y" => "Solitary",
        },
    },
    Attribute {
        name: "habitat",
        description: "Where the mushroom was found.",
        categories: categories! {
            "g" => "Grasses", "l" => "Leaves", "m" => "Meadows", "p" => "Paths",
            "u" => "Urban", "w" => "Waste", "d" => "Woods",
        },
    },
];

static MUSHROOM: AttributeSchema = AttributeSchema::new(MUSHROOM_ATTRIBUTES);
