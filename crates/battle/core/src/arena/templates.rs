//! Built-in arena layouts.
//!
//! Legend: `#` wall, `.` floor, `P` player spawn, `E` enemy spawn,
//! `R` reinforcement entry, `L` lava, `F` fire, `M` miasma, `I` ice, `^` spikes.

use super::{ArenaTheme, TemplateSource};

pub const BUILTIN: &[TemplateSource] = &[
    TemplateSource {
        name: "crypt_hall",
        theme: ArenaTheme::Crypt,
        is_boss: false,
        layout: "\
###############\n\
#R....R.R....R#\n\
#.EE.......EE.#\n\
#..#.^...^.#..#\n\
#..#...M...#..#\n\
#R.....P.....R#\n\
#..#...M...#..#\n\
#..#.^...^.#..#\n\
#.E.........E.#\n\
#R....R.R....R#\n\
###############",
    },
    TemplateSource {
        name: "crypt_ossuary",
        theme: ArenaTheme::Crypt,
        is_boss: false,
        layout: "\
###############\n\
#R.....R.....R#\n\
#..##.EEE.##..#\n\
#..#.......#..#\n\
#.....^.^.....#\n\
#R..M..P..M..R#\n\
#.....^.^.....#\n\
#..#.......#..#\n\
#..##.....##..#\n\
#R.....R.....R#\n\
###############",
    },
    TemplateSource {
        name: "cavern_fork",
        theme: ArenaTheme::Cavern,
        is_boss: false,
        layout: "\
###############\n\
#R...R...R...R#\n\
#.E.##...##.E.#\n\
#...#..^..#...#\n\
#.E...I.I...E.#\n\
#R.....P.....R#\n\
#.^...I.I...^.#\n\
#...#.....#...#\n\
#...##...##...#\n\
#R...R...R...R#\n\
###############",
    },
    TemplateSource {
        name: "cavern_pools",
        theme: ArenaTheme::Cavern,
        is_boss: false,
        layout: "\
###############\n\
#R.....R.....R#\n\
#.EE.......EE.#\n\
#...II...II...#\n\
#.#.I..^..I.#.#\n\
#R.....P.....R#\n\
#.#.I.....I.#.#\n\
#...II...II...#\n\
#.............#\n\
#R.....R.....R#\n\
###############",
    },
    TemplateSource {
        name: "volcano_rift",
        theme: ArenaTheme::Volcano,
        is_boss: false,
        layout: "\
###############\n\
#R.....R.....R#\n\
#.EE..LLL..EE.#\n\
#.....LLL.....#\n\
#..F.......F..#\n\
#R.....P.....R#\n\
#..F.......F..#\n\
#....#...#....#\n\
#.E..#...#..E.#\n\
#R.....R.....R#\n\
###############",
    },
    TemplateSource {
        name: "volcano_caldera",
        theme: ArenaTheme::Volcano,
        is_boss: false,
        layout: "\
###############\n\
#R....R.R....R#\n\
#.E....E....E.#\n\
#..LL.....LL..#\n\
#..L..F.F..L..#\n\
#R.....P.....R#\n\
#..L..F.F..L..#\n\
#..LL.....LL..#\n\
#.............#\n\
#R....R.R....R#\n\
###############",
    },
    TemplateSource {
        name: "glacier_shelf",
        theme: ArenaTheme::Glacier,
        is_boss: false,
        layout: "\
###############\n\
#R.....R.....R#\n\
#.EE.IIIII.EE.#\n\
#....I...I....#\n\
#.#.........#.#\n\
#R.....P.....R#\n\
#.#..^...^..#.#\n\
#....I...I....#\n\
#.E..IIIII..E.#\n\
#R.....R.....R#\n\
###############",
    },
    TemplateSource {
        name: "glacier_crevasse",
        theme: ArenaTheme::Glacier,
        is_boss: false,
        layout: "\
###############\n\
#R....R.R....R#\n\
#.E.........E.#\n\
#.IIII...IIII.#\n\
#.....#.#.....#\n\
#R.....P.....R#\n\
#.....#.#.....#\n\
#.IIII...IIII.#\n\
#.E...E.E...E.#\n\
#R....R.R....R#\n\
###############",
    },
    TemplateSource {
        name: "crypt_throne",
        theme: ArenaTheme::Crypt,
        is_boss: true,
        layout: "\
#####################\n\
#R........R........R#\n\
#...##.........##...#\n\
#...#...EEEEE...#...#\n\
#.......#...#.......#\n\
#..^....#...#....^..#\n\
#...................#\n\
#R.......MPM.......R#\n\
#...................#\n\
#..^.............^..#\n\
#...#...E...E...#...#\n\
#...##.........##...#\n\
#.........P.........#\n\
#R........R........R#\n\
#####################",
    },
    TemplateSource {
        name: "cavern_lair",
        theme: ArenaTheme::Cavern,
        is_boss: true,
        layout: "\
#####################\n\
#R........R........R#\n\
#...................#\n\
#..##...EEEEE...##..#\n\
#..#.....^.^.....#..#\n\
#.....II.....II.....#\n\
#....I.........I....#\n\
#R........P........R#\n\
#....I.........I....#\n\
#.....II.....II.....#\n\
#..#.....^.^.....#..#\n\
#..##...........##..#\n\
#...E...........E...#\n\
#R........R........R#\n\
#####################",
    },
    TemplateSource {
        name: "volcano_forge",
        theme: ArenaTheme::Volcano,
        is_boss: true,
        layout: "\
#####################\n\
#R........R........R#\n\
#..LLL....E....LLL..#\n\
#..L.....EEE.....L..#\n\
#.......F...F.......#\n\
#...#...........#...#\n\
#.....F.......F.....#\n\
#R........P........R#\n\
#.....F.......F.....#\n\
#...#...........#...#\n\
#.......F...F.......#\n\
#..L.............L..#\n\
#..LLL...E.E...LLL..#\n\
#R........R........R#\n\
#####################",
    },
    TemplateSource {
        name: "glacier_spire",
        theme: ArenaTheme::Glacier,
        is_boss: true,
        layout: "\
#####################\n\
#R........R........R#\n\
#.IIII.........IIII.#\n\
#.I......EEE......I.#\n\
#...................#\n\
#....#....^....#....#\n\
#.......I...I.......#\n\
#R........P........R#\n\
#.......I...I.......#\n\
#....#....^....#....#\n\
#...................#\n\
#.I......E.E......I.#\n\
#.IIII.........IIII.#\n\
#R........R........R#\n\
#####################",
    },
];
