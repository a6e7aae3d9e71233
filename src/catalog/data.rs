use super::{Course, Season, WalkDuration, WeatherStyle};

use Season::{Autumn, Spring, Summer, Winter};
use WalkDuration::{Ninety, Sixty, Thirty};
use WeatherStyle::{Clear, Cloudy, Rainy};

const ALL_SEASONS: &[Season] = &[Spring, Summer, Autumn, Winter];
const FAIR: &[WeatherStyle] = &[Clear, Cloudy];
const INDOOR: &[WeatherStyle] = &[Rainy, Cloudy];

fn course(
    id: u32,
    name: &str,
    area: &str,
    duration: WalkDuration,
    distance: f64,
    seasons: &[Season],
    weather_styles: &[WeatherStyle],
    description: &str,
) -> Course {
    Course {
        id,
        name: name.to_string(),
        area: area.to_string(),
        duration,
        distance,
        seasons: seasons.to_vec(),
        weather_styles: weather_styles.to_vec(),
        description: description.to_string(),
        start_point: None,
        end_point: None,
        highlights: Vec::new(),
        access_info: None,
        difficulty: None,
        duration_note: None,
        recommended_times: Vec::new(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn builtin_courses() -> Vec<Course> {
    vec![
        // Spring
        Course {
            start_point: Some("Nakameguro Station".to_string()),
            end_point: Some("Ikejiri-ohashi Station".to_string()),
            highlights: strings(&["About 800 cherry trees along the river", "Evening lanterns during peak bloom"]),
            access_info: Some("1 min from Nakameguro Station (Tokyu Toyoko / Hibiya Line)".to_string()),
            difficulty: Some("easy".to_string()),
            recommended_times: strings(&["morning", "evening"]),
            ..course(
                1,
                "Meguro River Cherry Blossom Walk",
                "Nakameguro",
                Sixty,
                3.8,
                &[Spring],
                FAIR,
                "Around 800 cherry trees line the river banks. A favourite for a sunny spring stroll.",
            )
        },
        Course {
            highlights: strings(&["About 1,200 cherry trees", "Museums and the zoo close by"]),
            access_info: Some("2 min from JR Ueno Station, Park Exit".to_string()),
            ..course(
                2,
                "Ueno Park Cherry Blossom Stroll",
                "Ueno",
                Ninety,
                5.2,
                &[Spring],
                FAIR,
                "A vast park with around 1,200 cherry trees, plus museums and the zoo to fill the walk.",
            )
        },
        course(
            3,
            "Chidorigafuchi Blossom Tunnel",
            "Chiyoda",
            Thirty,
            1.6,
            &[Spring],
            FAIR,
            "A tunnel of cherry blossoms along the Imperial Palace moat. A quiet path in the city centre.",
        ),
        // Summer
        Course {
            start_point: Some("Todoroki Station".to_string()),
            end_point: Some("Todoroki Fudoson".to_string()),
            difficulty: Some("easy".to_string()),
            duration_note: Some("Steps near the valley entrance can be slippery after rain".to_string()),
            ..course(
                4,
                "Todoroki Valley Cool Walk",
                "Todoroki",
                Sixty,
                2.9,
                &[Summer],
                FAIR,
                "The only ravine in Tokyo's 23 wards. Shade and the sound of the stream keep it cool.",
            )
        },
        course(
            5,
            "Showa Kinen Park Green Path",
            "Tachikawa",
            Ninety,
            6.1,
            &[Summer],
            FAIR,
            "Long shaded paths across a huge park, with fountains to cool off by. A summer classic.",
        ),
        course(
            6,
            "Hamarikyu Gardens Stroll",
            "Shiodome",
            Thirty,
            1.8,
            &[Summer],
            FAIR,
            "A garden with a tidal pond and a pleasant sea breeze. An oasis among the towers.",
        ),
        Course {
            recommended_times: strings(&["evening"]),
            ..course(
                7,
                "Odaiba Seaside Evening Walk",
                "Odaiba",
                Sixty,
                4.0,
                &[Summer],
                FAIR,
                "Walk the waterfront with views of Rainbow Bridge. Best from late afternoon onwards.",
            )
        },
        // Autumn
        course(
            8,
            "Meiji Jingu Gaien Ginkgo Avenue",
            "Aoyama",
            Thirty,
            1.5,
            &[Autumn],
            FAIR,
            "146 ginkgo trees form a golden tunnel. One of the defining sights of autumn in Tokyo.",
        ),
        Course {
            highlights: strings(&["Classic Edo-period landscape garden", "Evening illuminations in late autumn"]),
            ..course(
                9,
                "Rikugien Autumn Leaves",
                "Komagome",
                Sixty,
                2.4,
                &[Autumn],
                FAIR,
                "Enjoy the autumn colours in a beautiful Japanese garden. The light-up season is worth a visit too.",
            )
        },
        course(
            10,
            "Yoyogi Park Foliage Path",
            "Yoyogi",
            Ninety,
            5.0,
            &[Autumn],
            FAIR,
            "Wide lawns and turning trees. An unhurried autumn walk in an urban oasis.",
        ),
        course(
            11,
            "Showa Kinen Park Ginkgo Row",
            "Tachikawa",
            Ninety,
            5.8,
            &[Autumn],
            FAIR,
            "A 200 m avenue of golden ginkgo inside a vast park with plenty of room to wander.",
        ),
        // Winter
        Course {
            access_info: Some("5 min from Otemachi Station, Exit C13a".to_string()),
            ..course(
                12,
                "Imperial Palace East Gardens",
                "Otemachi",
                Sixty,
                3.2,
                &[Winter],
                FAIR,
                "A history walk around the ruins of Edo Castle in the crisp winter air.",
            )
        },
        course(
            13,
            "Tsukiji Outer Market Food Walk",
            "Tsukiji",
            Thirty,
            1.2,
            &[Winter],
            FAIR,
            "Browse while snacking on warm street food. A tasty way to forget the cold.",
        ),
        Course {
            recommended_times: strings(&["night"]),
            ..course(
                14,
                "Marunouchi Illumination Walk",
                "Marunouchi",
                Sixty,
                2.6,
                &[Winter],
                FAIR,
                "Winter illuminations light up the streets on this evening course.",
            )
        },
        // All seasons, fair weather
        Course {
            start_point: Some("Kaminarimon Gate".to_string()),
            end_point: Some("Sensoji Temple".to_string()),
            ..course(
                15,
                "Sensoji and Nakamise Street",
                "Asakusa",
                Sixty,
                2.2,
                ALL_SEASONS,
                FAIR,
                "Tokyo's best-known sightseeing spot, full of old downtown atmosphere.",
            )
        },
        course(
            16,
            "Yanaka Ginza Shitamachi Walk",
            "Yanaka",
            Thirty,
            1.4,
            ALL_SEASONS,
            FAIR,
            "A retro shopping street and a neighbourhood of cats where time runs slowly.",
        ),
        course(
            17,
            "Omotesando and Harajuku Street Walk",
            "Omotesando",
            Ninety,
            4.5,
            ALL_SEASONS,
            FAIR,
            "Stroll a district of the latest trends and stylish cafes.",
        ),
        // Rainy-day courses
        Course {
            difficulty: Some("easy".to_string()),
            duration_note: Some("Mostly underground; allow extra time at peak hours".to_string()),
            ..course(
                18,
                "Tokyo Station Underground Quest",
                "Tokyo Station",
                Thirty,
                1.7,
                ALL_SEASONS,
                INDOOR,
                "Explore the vast underground malls. Food and shopping without worrying about the rain.",
            )
        },
        course(
            19,
            "Shinjuku Underground Walk",
            "Shinjuku",
            Sixty,
            3.0,
            ALL_SEASONS,
            INDOOR,
            "Wander a labyrinth of underground passages that stays comfortable on rainy days.",
        ),
        course(
            20,
            "Shibuya Scramble Square Loop",
            "Shibuya",
            Thirty,
            1.5,
            ALL_SEASONS,
            INDOOR,
            "An urban walk between indoor facilities, with an observation deck and shopping.",
        ),
        course(
            21,
            "Roppongi Hills and Midtown",
            "Roppongi",
            Sixty,
            2.8,
            ALL_SEASONS,
            INDOOR,
            "Art and shopping on a rain-friendly course that stays mostly indoors.",
        ),
        course(
            22,
            "Ameyoko Arcade Walk",
            "Ueno",
            Thirty,
            1.1,
            ALL_SEASONS,
            INDOOR,
            "A covered arcade with lively downtown energy, even in the rain.",
        ),
        // More seasonal courses
        course(
            23,
            "Inokashira Park Fresh Green Walk",
            "Kichijoji",
            Sixty,
            3.1,
            &[Spring],
            FAIR,
            "New leaves surround the pond. A rowing boat ride is a good addition.",
        ),
        Course {
            start_point: Some("Azumabashi Bridge".to_string()),
            end_point: Some("Tokyo Skytree".to_string()),
            recommended_times: strings(&["evening"]),
            ..course(
                24,
                "Sumida River Terrace Summer Evening",
                "Asakusa / Skytree",
                Ninety,
                5.5,
                &[Summer],
                FAIR,
                "Walk along the river with Skytree in view. Best from the early evening.",
            )
        },
        course(
            25,
            "Shinjuku Gyoen Autumn Colours",
            "Shinjuku",
            Ninety,
            4.8,
            &[Autumn],
            FAIR,
            "A huge garden with many kinds of autumn foliage, surprisingly quiet for the city.",
        ),
        course(
            26,
            "Jindaiji New Year Walk",
            "Chofu",
            Sixty,
            3.4,
            &[Winter],
            FAIR,
            "An old temple and its soba shops. The clear winter air makes this course a pleasure.",
        ),
    ]
}
