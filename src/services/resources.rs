//! Curated external links shown on the health and mental-health resource
//! pages. Sections are shared between collections where the pages overlap.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub name: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub links: &'static [Link],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    Health,
    MentalHealth,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionView {
    pub collection: Collection,
    pub title: &'static str,
    pub intro: &'static str,
    pub sections: Vec<Section>,
}

const CRISIS_HELPLINES: Section = Section {
    title: "Crisis Helplines",
    links: &[
        Link {
            name: "National Suicide Prevention Lifeline",
            url: "https://suicidepreventionlifeline.org/",
        },
        Link {
            name: "SAMHSA's National Helpline",
            url: "https://www.samhsa.gov/find-help/national-helpline",
        },
    ],
};

const MENTAL_HEALTH_ORGS: &[Link] = &[
    Link {
        name: "National Institute of Mental Health",
        url: "https://www.nimh.nih.gov/",
    },
    Link {
        name: "National Alliance on Mental Illness",
        url: "https://www.nami.org/",
    },
];

const HEALTH_SECTIONS: &[Section] = &[
    Section {
        title: "Mental Health",
        links: MENTAL_HEALTH_ORGS,
    },
    Section {
        title: "Physical Health",
        links: &[
            Link {
                name: "Centers for Disease Control and Prevention",
                url: "https://www.cdc.gov/",
            },
            Link {
                name: "World Health Organization",
                url: "https://www.who.int/",
            },
        ],
    },
    Section {
        title: "Nutrition",
        links: &[
            Link {
                name: "Nutrition.gov",
                url: "https://www.nutrition.gov/",
            },
            Link {
                name: "Academy of Nutrition and Dietetics",
                url: "https://www.eatright.org/",
            },
        ],
    },
    CRISIS_HELPLINES,
];

const MENTAL_HEALTH_SECTIONS: &[Section] = &[
    CRISIS_HELPLINES,
    Section {
        title: "Mental Health Organizations",
        links: MENTAL_HEALTH_ORGS,
    },
    Section {
        title: "Online Therapy Resources",
        links: &[
            Link {
                name: "BetterHelp",
                url: "https://www.betterhelp.com/",
            },
            Link {
                name: "Talkspace",
                url: "https://www.talkspace.com/",
            },
        ],
    },
    Section {
        title: "Self-Help Resources",
        links: &[
            Link {
                name: "Mindful - Healthy Mind, Healthy Life",
                url: "https://www.mindful.org/",
            },
            Link {
                name: "Psychology Today",
                url: "https://www.psychologytoday.com/",
            },
        ],
    },
];

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Health, Collection::MentalHealth];

    pub fn view(self) -> CollectionView {
        let (title, intro, sections) = match self {
            Collection::Health => (
                "Health Resources",
                "We are constantly updating our information to provide you with the latest health resources.",
                HEALTH_SECTIONS,
            ),
            Collection::MentalHealth => (
                "Mental Health Resources",
                "We are constantly updating our information to provide you with the latest mental health resources.",
                MENTAL_HEALTH_SECTIONS,
            ),
        };
        CollectionView {
            collection: self,
            title,
            intro,
            sections: sections.to_vec(),
        }
    }
}

/// One collection when asked for, otherwise every collection in page order.
pub fn catalog(only: Option<Collection>) -> Vec<CollectionView> {
    match only {
        Some(collection) => vec![collection.view()],
        None => Collection::ALL.iter().map(|c| c.view()).collect(),
    }
}
